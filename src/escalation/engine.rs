use serde::{Deserialize, Serialize};
use std::{fmt, io};

use super::{
    interval_table, Action, DoseInterval, DoseLadder, DoseSequencer, EscalationDecision,
    EscalationError, EscalationOptions, Rule,
};
use crate::data::{DoseHistory, ParseError};

/// Runs every escalation rule against the same history snapshot
///
/// The rules are independent analyses of one trial: they neither vote nor merge,
/// and a rule that fails reports its own error while the others still run.
#[derive(Debug, Clone)]
pub struct EscalationEngine {
    options: EscalationOptions,
    sequencer: DoseSequencer,
}

impl EscalationEngine {
    pub fn new(options: EscalationOptions) -> Result<Self, EscalationError> {
        options.validate()?;
        let sequencer = DoseSequencer::new(options.scale_factors.clone())?;
        Ok(Self { options, sequencer })
    }

    pub fn options(&self) -> &EscalationOptions {
        &self.options
    }

    pub fn sequencer(&self) -> &DoseSequencer {
        &self.sequencer
    }

    /// Evaluate a single rule
    pub fn decide(
        &self,
        rule: Rule,
        history: &DoseHistory,
    ) -> Result<EscalationDecision, EscalationError> {
        rule.evaluate(history, &self.sequencer)
    }

    /// Evaluate all five rules and tabulate the per-dose confidence intervals
    ///
    /// Fails only when the history is empty; rule-level failures are carried in
    /// the report.
    pub fn evaluate(&self, history: &DoseHistory) -> Result<EscalationReport, EscalationError> {
        if history.is_empty() {
            return Err(EscalationError::EmptyHistory);
        }
        let ladder = self.sequencer.ladder(history)?;
        let intervals = interval_table(history, self.options.alpha)?;

        let rules = Rule::ALL
            .iter()
            .map(|&rule| {
                let outcome = self.decide(rule, history);
                match &outcome {
                    Ok(decision) if decision.action == Action::Unhandled => {
                        tracing::warn!(
                            rule = %rule,
                            rationale = %decision.rationale,
                            "rule cannot decide"
                        )
                    }
                    Ok(decision) => {
                        tracing::debug!(
                            rule = %rule,
                            action = %decision.action,
                            dose = ?decision.dose,
                            "rule decided"
                        )
                    }
                    Err(e) => tracing::warn!(rule = %rule, error = %e, "rule failed"),
                }
                RuleReport { rule, outcome }
            })
            .collect();

        Ok(EscalationReport {
            ladder,
            intervals,
            rules,
        })
    }
}

/// One rule's outcome in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
    pub rule: Rule,
    pub outcome: Result<EscalationDecision, EscalationError>,
}

/// Everything produced by one evaluation of the escalation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationReport {
    pub ladder: DoseLadder,
    pub intervals: Vec<DoseInterval>,
    /// One entry per [Rule], in [Rule::ALL] order
    pub rules: Vec<RuleReport>,
}

impl EscalationReport {
    pub fn get(&self, rule: Rule) -> Option<&Result<EscalationDecision, EscalationError>> {
        self.rules.iter().find(|r| r.rule == rule).map(|r| &r.outcome)
    }

    /// Write the interval table as CSV
    pub fn write_intervals_csv<W: io::Write>(&self, writer: W) -> Result<(), ParseError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer
            .write_record(["dose", "patients", "dlts", "rate", "ci_low", "ci_high"])
            .map_err(|e| ParseError::CSVError(e.to_string()))?;
        for row in &self.intervals {
            writer
                .write_record([
                    row.dose.to_string(),
                    row.patients.to_string(),
                    row.dlts.to_string(),
                    row.rate.to_string(),
                    row.interval.lower.to_string(),
                    row.interval.upper.to_string(),
                ])
                .map_err(|e| ParseError::CSVError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ParseError::CSVError(e.to_string()))?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for EscalationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Dose ladder: {:?} (next candidate {})",
            self.ladder.doses(),
            self.ladder.candidate()
        )?;
        writeln!(f, "{:>12} {:>8} {:>6} {:>8}  CI", "Dose", "Patients", "DLTs", "Rate")?;
        for row in &self.intervals {
            writeln!(
                f,
                "{:>12} {:>8} {:>6} {:>8.3}  {}",
                row.dose, row.patients, row.dlts, row.rate, row.interval
            )?;
        }
        for report in &self.rules {
            match &report.outcome {
                Ok(decision) => writeln!(f, "{:<12} {}", report.rule.name(), decision)?,
                Err(e) => writeln!(f, "{:<12} ERROR: {}", report.rule.name(), e)?,
            }
        }
        Ok(())
    }
}
