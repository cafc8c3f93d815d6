//! Parametric dose-toxicity curves
//!
//! Each model maps a dose `x` (or `log10(dose)` when requested) to a probability of
//! dose-limiting toxicity. Results are clamped to `[0, 1]`.
//!
//! | Model | Parameters | p(x) |
//! |-------|------------|------|
//! | O'Quigley tanh | a | ((tanh x + 1) / 2)^a |
//! | O'Quigley logistic | a | exp(3 + a x) / (1 + exp(3 + a x)) |
//! | O'Quigley power | a | x^exp(a), x clamped to [0, 1] |
//! | Sigmoid | x50, h | x^h / (x50^h + x^h) |
//! | Gompertz | a, b, g | a exp(-b exp(-g x)) |
//! | Logistic | x0, g | 1 / (1 + exp(-g (x - x0))) |
//! | Richards | x0, g, nu | (1 + exp(-g (x - x0)))^(-1/nu) |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SimulationError;

/// Family of dose-toxicity curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    OQuigleyTanh,
    OQuigleyLogistic,
    OQuigleyPower,
    Sigmoid,
    Gompertz,
    Logistic,
    Richards,
}

impl ModelKind {
    pub const ALL: [ModelKind; 7] = [
        ModelKind::OQuigleyTanh,
        ModelKind::OQuigleyLogistic,
        ModelKind::OQuigleyPower,
        ModelKind::Sigmoid,
        ModelKind::Gompertz,
        ModelKind::Logistic,
        ModelKind::Richards,
    ];

    /// Names of the free parameters, in the order they are supplied
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            ModelKind::OQuigleyTanh | ModelKind::OQuigleyLogistic | ModelKind::OQuigleyPower => {
                &["a"]
            }
            ModelKind::Sigmoid => &["x50", "h"],
            ModelKind::Gompertz => &["a", "b", "g"],
            ModelKind::Logistic => &["x0", "g"],
            ModelKind::Richards => &["x0", "g", "nu"],
        }
    }

    /// Number of free parameters
    pub fn arity(&self) -> usize {
        self.parameter_names().len()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::OQuigleyTanh => "oquigley-tanh",
            ModelKind::OQuigleyLogistic => "oquigley-logistic",
            ModelKind::OQuigleyPower => "oquigley-power",
            ModelKind::Sigmoid => "sigmoid",
            ModelKind::Gompertz => "gompertz",
            ModelKind::Logistic => "logistic",
            ModelKind::Richards => "richards",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('\'', "").replace(['_', ' '], "-");
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| SimulationError::UnknownModel(s.to_string()))
    }
}

/// A dose-toxicity curve with its parameter values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseResponseModel {
    kind: ModelKind,
    parameters: Vec<f64>,
    log_dose: bool,
}

impl DoseResponseModel {
    /// Fails with [SimulationError::ParameterCountMismatch] when the number of
    /// parameters differs from the model's arity
    pub fn new(kind: ModelKind, parameters: &[f64]) -> Result<Self, SimulationError> {
        if parameters.len() != kind.arity() {
            return Err(SimulationError::ParameterCountMismatch {
                model: kind,
                expected: kind.arity(),
                found: parameters.len(),
            });
        }
        Ok(Self {
            kind,
            parameters: parameters.to_vec(),
            log_dose: false,
        })
    }

    /// Evaluate the curve on `log10(dose)` instead of the dose itself
    pub fn with_log_dose(mut self, log_dose: bool) -> Self {
        self.log_dose = log_dose;
        self
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Probability of a DLT at `dose`
    ///
    /// May be NaN for degenerate parameter values (e.g. `nu = 0`).
    pub fn probability(&self, dose: f64) -> f64 {
        let x = if self.log_dose { dose.log10() } else { dose };
        let p = &self.parameters;
        let value = match self.kind {
            ModelKind::OQuigleyTanh => ((x.tanh() + 1.0) / 2.0).powf(p[0]),
            ModelKind::OQuigleyLogistic => logistic(3.0 + p[0] * x),
            ModelKind::OQuigleyPower => x.clamp(0.0, 1.0).powf(p[0].exp()),
            ModelKind::Sigmoid => {
                if x <= 0.0 {
                    0.0
                } else {
                    let xh = x.powf(p[1]);
                    xh / (p[0].powf(p[1]) + xh)
                }
            }
            ModelKind::Gompertz => p[0] * (-p[1] * (-p[2] * x).exp()).exp(),
            ModelKind::Logistic => logistic(p[1] * (x - p[0])),
            ModelKind::Richards => (1.0 + (-p[1] * (x - p[0])).exp()).powf(-1.0 / p[2]),
        };
        value.clamp(0.0, 1.0)
    }
}

/// `1 / (1 + exp(-z))`, saturating cleanly at ±∞
fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
