//! Escalation error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while sequencing doses or evaluating a rule
///
/// A rule reporting [`Action::Unhandled`](super::Action::Unhandled) is not an error;
/// these variants cover malformed input and dose lookups that cannot be resolved.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EscalationError {
    /// No dose has been recorded, so there is no current dose to reason about
    #[error("Dose history is empty")]
    EmptyHistory,

    /// A dose could not be located on the ladder
    #[error("Dose {dose} is not on the escalation ladder")]
    DoseNotFound { dose: f64 },

    /// A de-escalation asked for a dose below the lowest one tried
    #[error("No dose {steps} step(s) below {dose} on the escalation ladder")]
    NoLowerDose { dose: f64, steps: usize },

    /// An escalation asked for a dose above the highest candidate
    #[error("No dose above {dose} on the escalation ladder")]
    NoHigherDose { dose: f64 },

    /// Scale factors must be finite and positive with at least one above 1
    #[error("Invalid scale factors {factors:?}: all must be finite and > 0, at least one > 1")]
    InvalidScaleFactors { factors: Vec<f64> },

    /// Significance level outside (0, 1)
    #[error("Invalid alpha: {alpha}, must lie in (0, 1)")]
    InvalidAlpha { alpha: f64 },

    /// Binomial counts that do not describe a proportion
    #[error("Invalid proportion: {k} responses out of {n} patients")]
    InvalidProportion { k: usize, n: usize },
}
