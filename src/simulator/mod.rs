//! Dose-response simulation
//!
//! [DoseResponseSimulator] draws one Bernoulli response per dose from a parametric
//! [DoseResponseModel] and appends it to a [DoseHistory], exercising the same data
//! structure the escalation rules read. [simulate_trial] closes the loop by letting
//! a rule choose every next dose, and [operating_characteristics] repeats such
//! trials to summarise how a design behaves under a given curve.

pub mod model;
mod trial;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{DoseHistory, HistoryError, Response};
use crate::escalation::EscalationError;
pub use model::{DoseResponseModel, ModelKind};
pub use trial::{
    operating_characteristics, simulate_trial, MtdFrequency, OperatingCharacteristics,
    StopReason, TrialDesign, TrialOutcome,
};

/// Errors raised by the simulator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The parameter list does not match the model's arity
    #[error("Model {model} takes {expected} parameter(s), got {found}")]
    ParameterCountMismatch {
        model: ModelKind,
        expected: usize,
        found: usize,
    },
    #[error("Unknown dose-response model: {0}")]
    UnknownModel(String),
    /// The model evaluated to NaN at this dose
    #[error("Model probability at dose {dose} is not a number")]
    InvalidProbability { dose: f64 },
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Escalation(#[from] EscalationError),
}

/// Source of uniform draws on `[0, 1)`
///
/// Implemented for every [rand::RngCore]; [ReplayDraws] replays a fixed sequence.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: rand::RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed sequence of uniform values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ReplayDraws {
    draws: Vec<f64>,
    position: usize,
}

impl ReplayDraws {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, position: 0 }
    }
}

impl UniformSource for ReplayDraws {
    fn next_uniform(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.position % self.draws.len()];
        self.position += 1;
        value
    }
}

/// One simulated patient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDraw {
    pub dose: f64,
    pub probability: f64,
    pub uniform: f64,
    pub response: Response,
    /// Whether the response was appended to the history; only finite positive
    /// doses are
    pub recorded: bool,
}

/// Draws Bernoulli responses from a dose-toxicity curve
#[derive(Debug, Clone)]
pub struct DoseResponseSimulator {
    model: DoseResponseModel,
}

impl DoseResponseSimulator {
    pub fn new(model: DoseResponseModel) -> Self {
        Self { model }
    }

    /// Build the model and simulator in one step
    pub fn from_parameters(kind: ModelKind, parameters: &[f64]) -> Result<Self, SimulationError> {
        Ok(Self::new(DoseResponseModel::new(kind, parameters)?))
    }

    pub fn model(&self) -> &DoseResponseModel {
        &self.model
    }

    /// Simulate one patient at each of `doses` and append the responses to `history`
    ///
    /// A patient has a DLT when the uniform draw falls below the model probability.
    /// Every requested X is drawn and returned, including `X <= 0`, but only
    /// finite positive doses are appended to `history`. The curve is checked at
    /// every X before the first draw, so on error `history` is left untouched.
    pub fn simulate<U: UniformSource + ?Sized>(
        &self,
        doses: &[f64],
        draws: &mut U,
        history: &mut DoseHistory,
    ) -> Result<Vec<SimulatedDraw>, SimulationError> {
        let probabilities = doses
            .iter()
            .map(|&dose| {
                let probability = self.model.probability(dose);
                if probability.is_nan() {
                    return Err(SimulationError::InvalidProbability { dose });
                }
                Ok(probability)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut simulated = Vec::with_capacity(doses.len());
        for (&dose, probability) in doses.iter().zip(probabilities) {
            let uniform = draws.next_uniform();
            let response = Response::from(uniform < probability);
            let recorded = dose.is_finite() && dose > 0.0;
            tracing::trace!(
                dose,
                probability,
                uniform,
                dlt = response.is_dlt(),
                recorded,
                "simulated patient"
            );
            if recorded {
                history.append(dose, response)?;
            }
            simulated.push(SimulatedDraw {
                dose,
                probability,
                uniform,
                response,
                recorded,
            });
        }
        Ok(simulated)
    }
}
