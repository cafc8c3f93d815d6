pub mod builder;
pub mod history;
pub mod parser;
pub use builder::{BuilderError, DoseHistoryBuilder, DoseHistoryBuilderExt};
pub use history::{DoseHistory, DoseRecord, HistoryError, Response, Treatment, DOSE_TOLERANCE};
pub use parser::{parse_measurements, ParseError};
