use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{DoseResponseSimulator, SimulationError, UniformSource};
use crate::data::{DoseHistory, HistoryError, DOSE_TOLERANCE};
use crate::escalation::{
    Action, DoseSequencer, EscalationDecision, EscalationError, EscalationOptions, Rule,
};

/// How a simulated trial is run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDesign {
    pub rule: Rule,
    pub start_dose: f64,
    /// Total number of patients the trial may enrol
    pub max_patients: usize,
}

impl TrialDesign {
    pub fn new(rule: Rule, start_dose: f64, max_patients: usize) -> Self {
        Self {
            rule,
            start_dose,
            max_patients,
        }
    }
}

/// Why a simulated trial ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StopReason {
    /// The rule discontinued escalation
    Discontinued,
    /// The rule reached a case it does not define
    Unhandled,
    /// The rule could not resolve a dose
    RuleFailed(EscalationError),
    /// The enrolment cap was reached
    PatientLimit,
}

/// Result of one closed-loop trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub history: DoseHistory,
    /// Every decision taken, in order
    pub decisions: Vec<EscalationDecision>,
    pub stop: StopReason,
    /// The MTD when the rule discontinued, or the dose it would give next when
    /// the patient limit stopped the trial
    pub mtd: Option<f64>,
}

/// Run one trial in which `design.rule` chooses every next dose and the simulator
/// supplies the patients' responses
///
/// Cohorts of [`Rule::cohort_size`] patients are treated at each new dose, and
/// `additional_patients` on a repeat. The last cohort is truncated to respect
/// `max_patients`. The starting dose must be finite and positive so that every
/// patient is recorded.
pub fn simulate_trial<U: UniformSource + ?Sized>(
    simulator: &DoseResponseSimulator,
    options: &EscalationOptions,
    design: &TrialDesign,
    draws: &mut U,
) -> Result<TrialOutcome, SimulationError> {
    options.validate()?;
    if !design.start_dose.is_finite() || design.start_dose <= 0.0 {
        return Err(HistoryError::InvalidDose {
            dose: design.start_dose,
        }
        .into());
    }
    let sequencer = DoseSequencer::new(options.scale_factors.clone())?;
    let mut history = DoseHistory::new();
    let mut decisions: Vec<EscalationDecision> = Vec::new();
    let mut dose = design.start_dose;
    let mut cohort = design.rule.cohort_size();

    let (stop, mtd) = loop {
        let remaining = design.max_patients.saturating_sub(history.patient_count());
        if remaining == 0 {
            break (StopReason::PatientLimit, decisions.last().and_then(|d| d.dose));
        }
        let doses = vec![dose; cohort.min(remaining)];
        simulator.simulate(&doses, draws, &mut history)?;

        let decision = match design.rule.evaluate(&history, &sequencer) {
            Ok(decision) => decision,
            Err(e) => break (StopReason::RuleFailed(e), None),
        };
        decisions.push(decision.clone());

        match (decision.action, decision.dose) {
            (Action::Discontinue, mtd) => break (StopReason::Discontinued, mtd),
            (Action::Repeat, Some(next)) => {
                dose = next;
                cohort = decision.additional_patients.unwrap_or(1);
            }
            (Action::Advance | Action::DeEscalate, Some(next)) => {
                dose = next;
                cohort = design.rule.cohort_size();
            }
            _ => break (StopReason::Unhandled, None),
        }
    };

    tracing::debug!(
        rule = %design.rule,
        patients = history.patient_count(),
        dlts = history.dlt_count(),
        ?stop,
        ?mtd,
        "simulated trial finished"
    );
    Ok(TrialOutcome {
        history,
        decisions,
        stop,
        mtd,
    })
}

/// How often one dose was selected as MTD across replicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtdFrequency {
    pub dose: f64,
    /// True DLT probability of the dose under the simulated curve
    pub probability: f64,
    pub count: usize,
    pub fraction: f64,
}

/// Summary of many simulated trials under one design and curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingCharacteristics {
    pub replicates: usize,
    /// MTD selections, ascending by dose
    pub mtd_selection: Vec<MtdFrequency>,
    /// Trials that ended without an MTD
    pub no_mtd: usize,
    pub discontinued: usize,
    pub unhandled: usize,
    pub failed: usize,
    pub patient_limit: usize,
    pub mean_patients: f64,
    pub mean_dlts: f64,
}

/// Run `replicates` independent trials in parallel
///
/// Replicate `i` draws from a [StdRng] seeded with `seed + i`, so results do not
/// depend on thread scheduling.
pub fn operating_characteristics(
    simulator: &DoseResponseSimulator,
    options: &EscalationOptions,
    design: &TrialDesign,
    replicates: usize,
    seed: u64,
) -> Result<OperatingCharacteristics, SimulationError> {
    let outcomes = (0..replicates)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_trial(simulator, options, design, &mut rng)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut selection: Vec<MtdFrequency> = Vec::new();
    let mut summary = OperatingCharacteristics {
        replicates,
        mtd_selection: Vec::new(),
        no_mtd: 0,
        discontinued: 0,
        unhandled: 0,
        failed: 0,
        patient_limit: 0,
        mean_patients: 0.0,
        mean_dlts: 0.0,
    };

    for outcome in &outcomes {
        match outcome.stop {
            StopReason::Discontinued => summary.discontinued += 1,
            StopReason::Unhandled => summary.unhandled += 1,
            StopReason::RuleFailed(_) => summary.failed += 1,
            StopReason::PatientLimit => summary.patient_limit += 1,
        }
        summary.mean_patients += outcome.history.patient_count() as f64;
        summary.mean_dlts += outcome.history.dlt_count() as f64;

        let Some(mtd) = outcome.mtd else {
            summary.no_mtd += 1;
            continue;
        };
        match selection
            .iter_mut()
            .find(|s| (s.dose - mtd).abs() <= DOSE_TOLERANCE)
        {
            Some(entry) => entry.count += 1,
            None => selection.push(MtdFrequency {
                dose: mtd,
                probability: simulator.model().probability(mtd),
                count: 1,
                fraction: 0.0,
            }),
        }
    }

    if replicates > 0 {
        summary.mean_patients /= replicates as f64;
        summary.mean_dlts /= replicates as f64;
    }
    for entry in &mut selection {
        entry.fraction = entry.count as f64 / replicates as f64;
    }
    selection.sort_by(|a, b| a.dose.total_cmp(&b.dose));
    summary.mtd_selection = selection;
    Ok(summary)
}
