use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Two doses closer than this are the same dose level
pub const DOSE_TOLERANCE: f64 = 1e-6;

/// Errors raised when extending a [DoseHistory]
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryError {
    /// Doses must be finite and strictly positive
    #[error("Invalid dose: {dose}, doses must be finite and positive")]
    InvalidDose { dose: f64 },
    /// A dose level cannot be recorded without at least one patient
    #[error("Cohort at dose {dose} has no responses")]
    EmptyCohort { dose: f64 },
}

/// Binary outcome for a single treated patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    /// No dose-limiting toxicity, written as `0`
    NoToxicity,
    /// Dose-limiting toxicity (DLT), written as `1`
    Toxicity,
}

impl Response {
    /// Parse the `0`/`1` encoding used by measurement and history files
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Response::NoToxicity),
            1 => Some(Response::Toxicity),
            _ => None,
        }
    }

    pub fn as_bit(self) -> u8 {
        match self {
            Response::NoToxicity => 0,
            Response::Toxicity => 1,
        }
    }

    /// Returns true if the patient experienced a dose-limiting toxicity
    pub fn is_dlt(self) -> bool {
        matches!(self, Response::Toxicity)
    }
}

impl From<bool> for Response {
    fn from(dlt: bool) -> Self {
        if dlt {
            Response::Toxicity
        } else {
            Response::NoToxicity
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_bit())
    }
}

/// All patients treated at one dose level, in treatment order
///
/// A record is only ever created together with its first response, so
/// `responses` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    dose: f64,
    responses: Vec<Response>,
}

impl DoseRecord {
    pub fn dose(&self) -> f64 {
        self.dose
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Number of patients treated at this dose
    pub fn patient_count(&self) -> usize {
        self.responses.len()
    }

    /// Number of dose-limiting toxicities observed at this dose
    pub fn response_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_dlt()).count()
    }

    /// Observed DLT rate, `response_count / patient_count`
    pub fn response_rate(&self) -> f64 {
        self.response_count() as f64 / self.patient_count() as f64
    }
}

/// One treated patient, as recorded in the treatment log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    /// Index of the [DoseRecord] the patient belongs to
    pub record: usize,
    pub dose: f64,
    pub response: Response,
}

/// Append-only record of the doses administered in an escalation trial
///
/// [DoseHistory] keeps one [DoseRecord] per distinct dose level, ordered by first
/// occurrence, together with a log of every treated patient in treatment order.
/// The log is what defines the "current" dose (the dose given to the most recent
/// patient) and the most recent responses, which differ from the last record
/// whenever a design revisits a lower dose.
///
/// Cloning a history gives an independent copy, so a prior run can be seeded
/// into a new one without the new appends leaking back.
///
/// # Examples
///
/// ```
/// use pkpd_escalation::prelude::data::*;
///
/// let mut history = DoseHistory::new();
/// history.append_cohort(0.05, &[Response::NoToxicity; 3]).unwrap();
/// history.append(0.10, Response::Toxicity).unwrap();
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.current().unwrap().dose(), 0.10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseHistory {
    records: Vec<DoseRecord>,
    treatments: Vec<Treatment>,
}

impl DoseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one patient treated at `dose`
    ///
    /// The response is added to the existing record for `dose` (within [DOSE_TOLERANCE])
    /// or starts a new record at the end of the history.
    pub fn append(&mut self, dose: f64, response: Response) -> Result<(), HistoryError> {
        if !dose.is_finite() || dose <= 0.0 {
            return Err(HistoryError::InvalidDose { dose });
        }
        let record = match self.find_index(dose) {
            Some(index) => index,
            None => {
                self.records.push(DoseRecord {
                    dose,
                    responses: Vec::new(),
                });
                self.records.len() - 1
            }
        };
        self.records[record].responses.push(response);
        self.treatments.push(Treatment {
            record,
            dose: self.records[record].dose,
            response,
        });
        Ok(())
    }

    /// Record a cohort of patients treated at the same dose, in order
    pub fn append_cohort(&mut self, dose: f64, responses: &[Response]) -> Result<(), HistoryError> {
        if responses.is_empty() {
            return Err(HistoryError::EmptyCohort { dose });
        }
        if !dose.is_finite() || dose <= 0.0 {
            return Err(HistoryError::InvalidDose { dose });
        }
        for &response in responses {
            self.append(dose, response)?;
        }
        Ok(())
    }

    pub fn records(&self) -> &[DoseRecord] {
        &self.records
    }

    /// Every treated patient, in treatment order
    pub fn treatments(&self) -> &[Treatment] {
        &self.treatments
    }

    /// Number of distinct dose levels
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of `dose` among the records, compared within [DOSE_TOLERANCE]
    pub fn find_index(&self, dose: f64) -> Option<usize> {
        self.records
            .iter()
            .position(|r| (r.dose - dose).abs() <= DOSE_TOLERANCE)
    }

    pub fn get(&self, dose: f64) -> Option<&DoseRecord> {
        self.find_index(dose).map(|i| &self.records[i])
    }

    /// The record of the dose given to the most recently treated patient
    pub fn current(&self) -> Option<&DoseRecord> {
        self.treatments.last().map(|t| &self.records[t.record])
    }

    /// The `n` most recent responses across all doses, oldest first
    pub fn last_responses(&self, n: usize) -> Vec<Response> {
        let start = self.treatments.len().saturating_sub(n);
        self.treatments[start..].iter().map(|t| t.response).collect()
    }

    /// Total number of patients treated
    pub fn patient_count(&self) -> usize {
        self.treatments.len()
    }

    /// Total number of dose-limiting toxicities across all doses
    pub fn dlt_count(&self) -> usize {
        self.treatments.iter().filter(|t| t.response.is_dlt()).count()
    }

    /// Distinct doses sorted ascending
    pub fn sorted_doses(&self) -> Vec<f64> {
        let mut doses: Vec<f64> = self.records.iter().map(|r| r.dose).collect();
        doses.sort_by(|a, b| a.total_cmp(b));
        doses
    }

    /// Consecutive runs of patients treated at the same dose
    ///
    /// Replaying the cohorts through [DoseHistory::append_cohort] reproduces both the
    /// records and the treatment order, which is what the persisted format relies on.
    pub fn cohorts(&self) -> Vec<(f64, Vec<Response>)> {
        let mut cohorts: Vec<(usize, f64, Vec<Response>)> = Vec::new();
        for treatment in &self.treatments {
            match cohorts.last_mut() {
                Some((record, _, responses)) if *record == treatment.record => {
                    responses.push(treatment.response)
                }
                _ => cohorts.push((
                    treatment.record,
                    treatment.dose,
                    vec![treatment.response],
                )),
            }
        }
        cohorts
            .into_iter()
            .map(|(_, dose, responses)| (dose, responses))
            .collect()
    }
}

impl fmt::Display for DoseHistory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (dose, responses) in self.cohorts() {
            write!(f, "{}:", dose)?;
            for response in responses {
                write!(f, " {}", response)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
