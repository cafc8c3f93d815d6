//! Exact binomial confidence intervals for observed DLT rates
//!
//! The Clopper-Pearson interval for `k` responses out of `n` patients is
//!
//! ```text
//! lower = B⁻¹(α/2;     k,     n - k + 1)
//! upper = B⁻¹(1 - α/2; k + 1, n - k)
//! ```
//!
//! where `B⁻¹` is the inverse regularized incomplete beta function. The quantile is
//! undefined at the boundaries, so `lower = 0` when `k = 0` and `upper = 1` when `k = n`.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF};
use std::fmt;

use super::EscalationError;
use crate::data::DoseHistory;

/// Two-sided interval for a proportion, both bounds in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, p: f64) -> bool {
        self.lower <= p && p <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.lower, self.upper)
    }
}

/// Clopper-Pearson interval for `k` DLTs among `n` patients
///
/// Fails only for `n = 0`, `k > n` or `alpha` outside `(0, 1)`.
pub fn clopper_pearson(
    k: usize,
    n: usize,
    alpha: f64,
) -> Result<ConfidenceInterval, EscalationError> {
    if n == 0 || k > n {
        return Err(EscalationError::InvalidProportion { k, n });
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(EscalationError::InvalidAlpha { alpha });
    }

    let p = k as f64 / n as f64;
    let invalid = |_| EscalationError::InvalidProportion { k, n };

    let lower = if k == 0 {
        0.0
    } else {
        Beta::new(k as f64, (n - k + 1) as f64)
            .map_err(invalid)?
            .inverse_cdf(alpha / 2.0)
    };
    let upper = if k == n {
        1.0
    } else {
        Beta::new((k + 1) as f64, (n - k) as f64)
            .map_err(invalid)?
            .inverse_cdf(1.0 - alpha / 2.0)
    };

    // Keep the solver's round-off from pushing a bound past the point estimate
    Ok(ConfidenceInterval {
        lower: lower.clamp(0.0, 1.0).min(p),
        upper: upper.clamp(0.0, 1.0).max(p),
    })
}

/// Observed DLT rate and its interval at one dose level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseInterval {
    pub dose: f64,
    pub patients: usize,
    pub dlts: usize,
    pub rate: f64,
    pub interval: ConfidenceInterval,
}

/// Interval table for every dose level, in the order the doses were first given
pub fn interval_table(
    history: &DoseHistory,
    alpha: f64,
) -> Result<Vec<DoseInterval>, EscalationError> {
    history
        .records()
        .iter()
        .map(|record| {
            let n = record.patient_count();
            let k = record.response_count();
            Ok(DoseInterval {
                dose: record.dose(),
                patients: n,
                dlts: k,
                rate: record.response_rate(),
                interval: clopper_pearson(k, n, alpha)?,
            })
        })
        .collect()
}
