use serde::{Deserialize, Serialize};

use super::sequencer::validate_scale_factors;
use super::EscalationError;

/// Complete escalation configuration
///
/// The same options drive the dose ladder, the confidence interval table and the
/// closed-loop trial simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationOptions {
    /// Multipliers applied to the highest tried dose to obtain the next candidate
    ///
    /// Factor `i` is used when `i + 1` doses have been tried; once the list is
    /// exhausted the last factor repeats. The default is the modified Fibonacci
    /// sequence (x2, x1.67, x1.4, x1.33, x1.33, ...), the starting dose being the
    /// implicit x1 step.
    pub scale_factors: Vec<f64>,

    /// Significance level of the two-sided Clopper-Pearson intervals (default: 0.05)
    pub alpha: f64,
}

impl Default for EscalationOptions {
    fn default() -> Self {
        Self {
            scale_factors: vec![2.0, 1.67, 1.4, 1.33],
            alpha: 0.05,
        }
    }
}

impl EscalationOptions {
    /// Set the scale factor sequence
    pub fn with_scale_factors(mut self, scale_factors: Vec<f64>) -> Self {
        self.scale_factors = scale_factors;
        self
    }

    /// Set the confidence interval significance level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Read options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), EscalationError> {
        validate_scale_factors(&self.scale_factors)?;
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(EscalationError::InvalidAlpha { alpha: self.alpha });
        }
        Ok(())
    }
}
