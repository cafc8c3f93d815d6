use crate::data::*;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Errors raised while reading measurement text or persisted histories
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    /// The line has no `:` or tab between the dose and its responses
    #[error("Line {line}: expected `<dose>: <r1> <r2> ...`, got `{content}`")]
    MissingSeparator { line: usize, content: String },
    /// The dose field is not a finite positive number
    #[error("Line {line}: invalid dose `{token}`")]
    InvalidDose { line: usize, token: String },
    /// A response token is not `0` or `1`
    #[error("Line {line}: response `{token}` must be 0 or 1")]
    InvalidResponse { line: usize, token: String },
    /// The line names a dose but lists no responses
    #[error("Line {line}: no responses listed for dose {dose}")]
    NoResponses { line: usize, dose: f64 },
    /// Error encountered when reading or writing CSV data
    #[error("CSV error: {0}")]
    CSVError(String),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Parse measurement text into cohorts, one per non-empty line
///
/// Each line reads `<dose>: <r1> <r2> ... <rn>`; a tab may replace the colon and
/// responses may be separated by whitespace or commas. Lines starting with `#`
/// are comments. Line numbers in errors are 1-based.
///
/// Nothing is returned unless every line parses.
pub fn parse_measurements(text: &str) -> Result<Vec<(f64, Vec<Response>)>, ParseError> {
    let mut cohorts = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let (dose_token, responses_token) = content
            .split_once(|c| c == ':' || c == '\t')
            .ok_or_else(|| ParseError::MissingSeparator {
                line,
                content: content.to_string(),
            })?;

        let dose_token = dose_token.trim();
        let dose = dose_token
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| ParseError::InvalidDose {
                line,
                token: dose_token.to_string(),
            })?;

        let responses = responses_token
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| match token {
                "0" => Ok(Response::NoToxicity),
                "1" => Ok(Response::Toxicity),
                _ => Err(ParseError::InvalidResponse {
                    line,
                    token: token.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if responses.is_empty() {
            return Err(ParseError::NoResponses { line, dose });
        }
        cohorts.push((dose, responses));
    }
    Ok(cohorts)
}

impl DoseHistory {
    /// Build the history for a new escalation run
    ///
    /// The prior run's records are copied in first, in their original order, then each
    /// line of `measurements` is appended: responses for a dose already present (within
    /// [DOSE_TOLERANCE]) extend that record, any other dose starts a new record.
    ///
    /// A malformed line aborts the whole load; no partial history is returned.
    pub fn load(prior: Option<&DoseHistory>, measurements: &str) -> Result<Self, ParseError> {
        let cohorts = parse_measurements(measurements)?;
        let mut history = prior.cloned().unwrap_or_default();
        for (dose, responses) in &cohorts {
            history.append_cohort(*dose, responses)?;
        }
        tracing::debug!(
            prior_doses = prior.map_or(0, |p| p.len()),
            new_cohorts = cohorts.len(),
            doses = history.len(),
            patients = history.patient_count(),
            "loaded dose history"
        );
        Ok(history)
    }

    /// Read a history written by [DoseHistory::to_text]
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        Self::load(None, text)
    }

    /// Persisted text form, one `dose: r1 r2 ...` line per cohort
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Write the treatment log as CSV with columns `order,dose,response`
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ParseError> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
        for (order, treatment) in self.treatments().iter().enumerate() {
            writer
                .serialize(TreatmentRow {
                    order: order + 1,
                    dose: treatment.dose,
                    response: treatment.response.as_bit(),
                })
                .map_err(|e| ParseError::CSVError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ParseError::CSVError(e.to_string()))?;
        Ok(())
    }

    /// Read a treatment log written by [DoseHistory::write_csv]
    ///
    /// Rows are replayed in the order of the `order` column.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for row_result in reader.deserialize() {
            let row: TreatmentRow =
                row_result.map_err(|e| ParseError::CSVError(e.to_string()))?;
            rows.push(row);
        }
        rows.sort_by_key(|row| row.order);

        let mut history = DoseHistory::new();
        for row in rows {
            let response =
                Response::from_bit(row.response).ok_or_else(|| ParseError::InvalidResponse {
                    line: row.order,
                    token: row.response.to_string(),
                })?;
            history.append(row.dose, response)?;
        }
        Ok(history)
    }
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[serde(rename_all = "lowercase")]
struct TreatmentRow {
    order: usize,
    dose: f64,
    response: u8,
}
