use thiserror::Error;

use crate::data::{BuilderError, HistoryError, ParseError};
use crate::escalation::EscalationError;
use crate::simulator::SimulationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PkpdError {
    #[error("Error parsing dose history: {0}")]
    ParseError(#[from] ParseError),
    #[error("Error in the dose history: {0}")]
    HistoryError(#[from] HistoryError),
    #[error("Error building dose history: {0}")]
    BuilderError(#[from] BuilderError),
    #[error("Error in the escalation rules: {0}")]
    EscalationError(#[from] EscalationError),
    #[error("Error in the simulation: {0}")]
    SimulationError(#[from] SimulationError),
}
