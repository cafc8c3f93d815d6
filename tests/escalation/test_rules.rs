//! End-to-end rule scenarios through EscalationEngine

use approx::assert_relative_eq;
use pkpd_escalation::prelude::*;

fn evaluate(text: &str) -> EscalationReport {
    let history = DoseHistory::from_text(text).unwrap();
    EscalationEngine::new(EscalationOptions::default())
        .unwrap()
        .evaluate(&history)
        .unwrap()
}

fn decision(report: &EscalationReport, rule: Rule) -> EscalationDecision {
    report.get(rule).unwrap().clone().unwrap()
}

#[test]
fn test_three_plus_three_advances_to_next_untried_dose() {
    let report = evaluate("0.05: 0 0 0");
    let d = decision(&report, Rule::ThreePlusThree);
    assert_eq!(d.action, Action::Advance);
    assert_relative_eq!(d.dose.unwrap(), 0.05 * 2.0);
    assert_eq!(d.dose, Some(report.ladder.candidate()));
}

#[test]
fn test_three_plus_three_discontinues_with_previous_mtd() {
    let report = evaluate("0.05: 0 0 0\n0.10: 1 1 0");
    let d = decision(&report, Rule::ThreePlusThree);
    assert_eq!(d.action, Action::Discontinue);
    assert_eq!(d.dose, Some(0.05));
}

#[test]
fn test_storer_c_reports_unhandled() {
    let report = evaluate("0.05: 0\n0.10: 1 0");
    let d = decision(&report, Rule::StorerC);
    assert_eq!(d.action, Action::Unhandled);
    assert_eq!(d.dose, None);
}

#[test]
fn test_all_rules_run_on_the_same_snapshot() {
    let report = evaluate("0.05: 0 0 0\n0.10: 0 1 0");
    assert_eq!(report.rules.len(), 5);

    assert_eq!(decision(&report, Rule::ThreePlusThree).action, Action::Repeat);
    assert_eq!(decision(&report, Rule::BestOfFive).action, Action::Repeat);
    assert_eq!(decision(&report, Rule::UpAndDown).action, Action::Advance);
    assert_eq!(decision(&report, Rule::StorerC).action, Action::Unhandled);
    // A DLT-free patient after the only DLT: stage 2 falls through to design C
    assert_eq!(decision(&report, Rule::StorerBC).action, Action::Unhandled);
}

#[test]
fn test_failed_rule_does_not_abort_the_others() {
    let report = evaluate("0.05: 1");
    assert!(report.get(Rule::UpAndDown).unwrap().is_err());
    assert!(report.get(Rule::StorerC).unwrap().is_err());
    assert!(report.get(Rule::StorerBC).unwrap().is_err());
    assert_eq!(decision(&report, Rule::ThreePlusThree).action, Action::Unhandled);
    assert_eq!(decision(&report, Rule::BestOfFive).action, Action::Unhandled);

    let text = report.to_string();
    assert!(text.contains("ERROR"));
}

#[test]
fn test_empty_history_is_fatal() {
    let engine = EscalationEngine::new(EscalationOptions::default()).unwrap();
    let err = engine.evaluate(&DoseHistory::new()).unwrap_err();
    assert_eq!(err, EscalationError::EmptyHistory);
    let err: PkpdError = err.into();
    assert!(err.to_string().contains("empty"));
}

#[test]
fn test_continuing_a_trial_across_runs() {
    let engine = EscalationEngine::new(EscalationOptions::default()).unwrap();

    let run1 = DoseHistory::load(None, "0.05: 0 0 0").unwrap();
    let next = decision(&engine.evaluate(&run1).unwrap(), Rule::ThreePlusThree)
        .dose
        .unwrap();

    let run2 = DoseHistory::load(Some(&run1), &format!("{}: 0 1 0", next)).unwrap();
    let d = decision(&engine.evaluate(&run2).unwrap(), Rule::ThreePlusThree);
    assert_eq!(d.action, Action::Repeat);
    assert_eq!(d.dose, Some(next));

    let run3 = DoseHistory::load(Some(&run2), &format!("{}: 0 0 0", next)).unwrap();
    let d = decision(&engine.evaluate(&run3).unwrap(), Rule::ThreePlusThree);
    assert_eq!(d.action, Action::Advance);
    assert_relative_eq!(d.dose.unwrap(), next * 1.67);

    assert_eq!(run1.patient_count(), 3);
    assert_eq!(run3.patient_count(), 9);
}

#[test]
fn test_unit_start_factor_advances_to_untried_dose() {
    let options =
        EscalationOptions::default().with_scale_factors(vec![1.0, 2.0, 1.67, 1.4, 1.33]);
    let engine = EscalationEngine::new(options).unwrap();
    let history = DoseHistory::from_text("0.05: 0 0 0").unwrap();
    let report = engine.evaluate(&history).unwrap();

    let d = decision(&report, Rule::ThreePlusThree);
    assert_eq!(d.action, Action::Advance);
    assert_relative_eq!(d.dose.unwrap(), 0.1);
}
