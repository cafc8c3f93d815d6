use crate::data::*;

pub trait DoseHistoryBuilderExt {
    fn builder() -> DoseHistoryBuilder;
}

impl DoseHistoryBuilderExt for DoseHistory {
    fn builder() -> DoseHistoryBuilder {
        DoseHistoryBuilder {
            history: DoseHistory::new(),
        }
    }
}

/// Fluent construction of a [DoseHistory] from literal cohorts
///
/// Cohorts are given as `0`/`1` bits in treatment order.
///
/// ```
/// use pkpd_escalation::prelude::data::*;
///
/// let history = DoseHistory::builder()
///     .cohort(0.05, &[0, 0, 0])
///     .cohort(0.10, &[1, 1, 0])
///     .build()
///     .unwrap();
/// assert_eq!(history.len(), 2);
/// ```
pub struct DoseHistoryBuilder {
    history: DoseHistory,
}

impl DoseHistoryBuilder {
    /// Start from a copy of a prior run's history
    pub fn seed(mut self, prior: &DoseHistory) -> Self {
        self.history = prior.clone();
        self
    }

    pub fn cohort(self, dose: f64, bits: &[u8]) -> CohortBuilder {
        CohortBuilder {
            builder: self,
            pending: vec![(dose, bits.to_vec())],
        }
    }

    /// The seeded history as is; cohorts are validated by [CohortBuilder::build]
    pub fn build(self) -> DoseHistory {
        self.history
    }
}

/// Accumulates cohorts so that validation happens once, in [CohortBuilder::build]
pub struct CohortBuilder {
    builder: DoseHistoryBuilder,
    pending: Vec<(f64, Vec<u8>)>,
}

impl CohortBuilder {
    pub fn cohort(mut self, dose: f64, bits: &[u8]) -> Self {
        self.pending.push((dose, bits.to_vec()));
        self
    }

    /// Single patient at `dose`
    pub fn patient(self, dose: f64, bit: u8) -> Self {
        self.cohort(dose, &[bit])
    }

    pub fn build(self) -> Result<DoseHistory, BuilderError> {
        let mut history = self.builder.history;
        for (dose, bits) in self.pending {
            let responses = bits
                .iter()
                .map(|&bit| {
                    Response::from_bit(bit).ok_or(BuilderError::InvalidBit { dose, bit })
                })
                .collect::<Result<Vec<_>, _>>()?;
            history.append_cohort(dose, &responses)?;
        }
        Ok(history)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    #[error("Response at dose {dose} must be 0 or 1, got {bit}")]
    InvalidBit { dose: f64, bit: u8 },
    #[error(transparent)]
    History(#[from] HistoryError),
}
