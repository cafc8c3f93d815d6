use serde::{Deserialize, Serialize};
use std::fmt;

use super::Rule;

/// What a rule recommends for the next patient or cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Treat the next cohort at the next higher dose
    Advance,
    /// Treat more patients at the current dose
    Repeat,
    /// Go back to a lower dose, which becomes the provisional MTD
    DeEscalate,
    /// Stop escalating; the recommended dose is the MTD
    Discontinue,
    /// The rule does not define an action for the current counts
    Unhandled,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            Action::Advance => "ADVANCE",
            Action::Repeat => "REPEAT",
            Action::DeEscalate => "DE_ESCALATE",
            Action::Discontinue => "DISCONTINUE",
            Action::Unhandled => "UNHANDLED",
        };
        write!(f, "{}", tag)
    }
}

/// The outcome of one rule on one history snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub rule: Rule,
    pub action: Action,
    /// Dose to treat next, or the MTD when discontinuing; `None` when the rule has
    /// no dose to offer (MTD below the lowest tried dose, or [Action::Unhandled])
    pub dose: Option<f64>,
    /// How many more patients to treat at the current dose for [Action::Repeat]
    pub additional_patients: Option<usize>,
    pub rationale: String,
}

impl EscalationDecision {
    pub(crate) fn new(rule: Rule, action: Action, dose: Option<f64>, rationale: String) -> Self {
        Self {
            rule,
            action,
            dose,
            additional_patients: None,
            rationale,
        }
    }

    pub(crate) fn repeat(rule: Rule, dose: f64, additional: usize, rationale: String) -> Self {
        Self {
            rule,
            action: Action::Repeat,
            dose: Some(dose),
            additional_patients: Some(additional),
            rationale,
        }
    }

    pub(crate) fn unhandled(rule: Rule, rationale: String) -> Self {
        Self::new(rule, Action::Unhandled, None, rationale)
    }
}

impl fmt::Display for EscalationDecision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(dose) = self.dose {
            write!(f, " {}", dose)?;
        }
        if let Some(n) = self.additional_patients {
            write!(f, " (+{} patients)", n)?;
        }
        write!(f, ": {}", self.rationale)
    }
}
