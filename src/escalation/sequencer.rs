//! Dose ladder construction
//!
//! The ladder is every dose tried so far, sorted ascending, plus one untried
//! candidate obtained by scaling the highest tried dose. Factors of 1 or less
//! cannot escalate and are skipped, so a leading `1.0` standing for the starting
//! dose is allowed. With `m` doses tried and `steps` the remaining factors, the
//! candidate is `max * steps[min(m - 1, len - 1)]`: each early factor is spent
//! exactly once and the last factor repeats indefinitely.

use serde::{Deserialize, Serialize};

use super::EscalationError;
use crate::data::{DoseHistory, DOSE_TOLERANCE};

/// Tried doses in ascending order followed by the next untried candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseLadder {
    doses: Vec<f64>,
    candidate: f64,
}

impl DoseLadder {
    /// All doses on the ladder, ascending
    pub fn doses(&self) -> &[f64] {
        &self.doses
    }

    /// The untried dose appended by the sequencer
    pub fn candidate(&self) -> f64 {
        self.candidate
    }

    /// Position of `dose` within [DOSE_TOLERANCE]
    pub fn position(&self, dose: f64) -> Option<usize> {
        self.doses
            .iter()
            .position(|d| (d - dose).abs() <= DOSE_TOLERANCE)
    }

    /// The next dose above `dose`
    pub fn above(&self, dose: f64) -> Result<f64, EscalationError> {
        let index = self
            .position(dose)
            .ok_or(EscalationError::DoseNotFound { dose })?;
        self.doses
            .get(index + 1)
            .copied()
            .ok_or(EscalationError::NoHigherDose { dose })
    }

    /// The dose `steps` rungs below `dose`
    pub fn below(&self, dose: f64, steps: usize) -> Result<f64, EscalationError> {
        let index = self
            .position(dose)
            .ok_or(EscalationError::DoseNotFound { dose })?;
        index
            .checked_sub(steps)
            .map(|i| self.doses[i])
            .ok_or(EscalationError::NoLowerDose { dose, steps })
    }
}

/// Generates candidate doses from the tried doses and a scale factor sequence
#[derive(Debug, Clone, PartialEq)]
pub struct DoseSequencer {
    scale_factors: Vec<f64>,
    /// The factors above 1, in order
    steps: Vec<f64>,
}

/// Factors must be finite and positive, with at least one above 1
pub(crate) fn validate_scale_factors(scale_factors: &[f64]) -> Result<(), EscalationError> {
    let positive = scale_factors.iter().all(|f| f.is_finite() && *f > 0.0);
    if !positive || !scale_factors.iter().any(|f| *f > 1.0) {
        return Err(EscalationError::InvalidScaleFactors {
            factors: scale_factors.to_vec(),
        });
    }
    Ok(())
}

impl DoseSequencer {
    pub fn new(scale_factors: Vec<f64>) -> Result<Self, EscalationError> {
        validate_scale_factors(&scale_factors)?;
        let steps = scale_factors.iter().copied().filter(|f| *f > 1.0).collect();
        Ok(Self {
            scale_factors,
            steps,
        })
    }

    pub fn scale_factors(&self) -> &[f64] {
        &self.scale_factors
    }

    /// Scale factor applied once `tried` doses have been given
    fn factor(&self, tried: usize) -> f64 {
        let index = tried.saturating_sub(1).min(self.steps.len() - 1);
        self.steps[index]
    }

    /// The next untried dose
    pub fn next_candidate(&self, history: &DoseHistory) -> Result<f64, EscalationError> {
        let doses = history.sorted_doses();
        let highest = doses.last().ok_or(EscalationError::EmptyHistory)?;
        Ok(highest * self.factor(doses.len()))
    }

    /// Build the ladder for the current state of `history`
    ///
    /// A candidate within [DOSE_TOLERANCE] of the highest dose is not duplicated
    /// on the ladder.
    pub fn ladder(&self, history: &DoseHistory) -> Result<DoseLadder, EscalationError> {
        let candidate = self.next_candidate(history)?;
        let mut doses = history.sorted_doses();
        if !doses
            .iter()
            .any(|d| (d - candidate).abs() <= DOSE_TOLERANCE)
        {
            doses.push(candidate);
            doses.sort_by(|a, b| a.total_cmp(b));
        }
        tracing::debug!(?doses, candidate, "built dose ladder");
        Ok(DoseLadder { doses, candidate })
    }
}
