//! Dose-escalation decision engine for phase I trials
//!
//! Given the accumulated [`DoseHistory`](crate::data::DoseHistory) of a trial, the
//! engine builds the dose ladder, tabulates an exact confidence interval for the
//! DLT rate at every dose, and asks each of five escalation designs what to do
//! next.
//!
//! # Usage
//!
//! ```rust
//! use pkpd_escalation::prelude::*;
//!
//! let history = DoseHistory::load(None, "0.05: 0 0 0\n0.10: 1 1 0").unwrap();
//! let engine = EscalationEngine::new(EscalationOptions::default()).unwrap();
//! let report = engine.evaluate(&history).unwrap();
//!
//! let decision = report.get(Rule::ThreePlusThree).unwrap().as_ref().unwrap();
//! assert_eq!(decision.action, Action::Discontinue);
//! assert_eq!(decision.dose, Some(0.05));
//! ```

mod confidence;
mod decision;
mod engine;
mod error;
mod options;
mod rules;
mod sequencer;


pub use confidence::{clopper_pearson, interval_table, ConfidenceInterval, DoseInterval};
pub use decision::{Action, EscalationDecision};
pub use engine::{EscalationEngine, EscalationReport, RuleReport};
pub use error::EscalationError;
pub use options::EscalationOptions;
pub use rules::{best_of_five, storer_bc, storer_c, three_plus_three, up_and_down, Rule};
pub use sequencer::{DoseLadder, DoseSequencer};
