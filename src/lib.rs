//! Dose-escalation decision rules and dose-response simulation for phase I trials
//!
//! The crate keeps the accumulated patient responses of a trial in a
//! [`DoseHistory`], evaluates five escalation designs against it (3+3, Best-of-5,
//! Up-and-Down, Storer C and Storer BC) and reports each design's recommendation
//! together with exact Clopper-Pearson intervals for the DLT rate at every dose.
//! A parametric dose-toxicity simulator extends the same history programmatically.
//!
//! ```rust
//! use pkpd_escalation::prelude::*;
//!
//! let prior = DoseHistory::from_text("0.05: 0 0 0").unwrap();
//! let history = DoseHistory::load(Some(&prior), "0.10: 0 1 0").unwrap();
//!
//! let engine = EscalationEngine::new(EscalationOptions::default()).unwrap();
//! let report = engine.evaluate(&history).unwrap();
//! println!("{}", report);
//! ```

pub mod data;
pub mod error;
pub mod escalation;
pub mod simulator;

//extension traits
pub use crate::data::builder::DoseHistoryBuilderExt;
pub use crate::data::*;
pub use crate::escalation::*;
pub use crate::simulator::{
    DoseResponseModel, DoseResponseSimulator, ModelKind, ReplayDraws, SimulationError,
    UniformSource,
};
pub use error::PkpdError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            builder::DoseHistoryBuilderExt, parse_measurements, DoseHistory, DoseRecord,
            ParseError, Response, Treatment, DOSE_TOLERANCE,
        };
    }
    pub mod simulator {
        pub use crate::simulator::{
            operating_characteristics, simulate_trial, DoseResponseModel, DoseResponseSimulator,
            ModelKind, OperatingCharacteristics, ReplayDraws, StopReason, TrialDesign,
            TrialOutcome, UniformSource,
        };
    }

    pub use crate::data::builder::DoseHistoryBuilderExt;
    pub use crate::data::{DoseHistory, DoseRecord, Response};
    pub use crate::escalation::{
        clopper_pearson, Action, ConfidenceInterval, DoseLadder, DoseSequencer,
        EscalationDecision, EscalationEngine, EscalationError, EscalationOptions,
        EscalationReport, Rule,
    };
    pub use crate::PkpdError;
}
