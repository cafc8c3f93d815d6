//! Tests for the Clopper-Pearson interval table and the dose ladder

use approx::assert_relative_eq;
use pkpd_escalation::prelude::*;

#[test]
fn test_interval_bounds_hold_for_all_counts() {
    for n in 1..=30 {
        for k in 0..=n {
            let ci = clopper_pearson(k, n, 0.05).unwrap();
            let p = k as f64 / n as f64;
            assert!(ci.lower >= 0.0 && ci.upper <= 1.0);
            assert!(ci.contains(p), "k={k} n={n}: {ci}");
            if k == 0 {
                assert_eq!(ci.lower, 0.0);
            }
            if k == n {
                assert_eq!(ci.upper, 1.0);
            }
        }
    }
}

#[test]
fn test_wider_interval_at_lower_alpha() {
    let ci95 = clopper_pearson(2, 10, 0.05).unwrap();
    let ci80 = clopper_pearson(2, 10, 0.20).unwrap();
    assert!(ci95.width() > ci80.width());
}

#[test]
fn test_report_has_interval_per_dose() {
    let history = DoseHistory::from_text("0.05: 0 0 0\n0.10: 1 0 0\n0.10: 0 0 0").unwrap();
    let engine = EscalationEngine::new(EscalationOptions::default()).unwrap();
    let report = engine.evaluate(&history).unwrap();

    assert_eq!(report.intervals.len(), 2);
    let second = &report.intervals[1];
    assert_eq!((second.patients, second.dlts), (6, 1));
    assert_relative_eq!(second.rate, 1.0 / 6.0);
    assert_eq!(second.interval, clopper_pearson(1, 6, 0.05).unwrap());
}

#[test]
fn test_next_candidate_exceeds_every_tried_dose() {
    let sequencer = DoseSequencer::new(vec![2.0, 1.67, 1.4, 1.33]).unwrap();
    let mut history = DoseHistory::from_text("3.0: 0 0 0").unwrap();
    for _ in 0..10 {
        let candidate = sequencer.next_candidate(&history).unwrap();
        let highest = history.sorted_doses().last().copied().unwrap();
        assert!(candidate > highest);

        let ladder = sequencer.ladder(&history).unwrap();
        assert_eq!(ladder.doses().last().copied(), Some(candidate));
        assert_eq!(ladder.doses().len(), history.len() + 1);

        history.append(candidate, Response::NoToxicity).unwrap();
    }
}

#[test]
fn test_custom_scale_factors_from_json() {
    let options = EscalationOptions::from_json(r#"{"scale_factors": [1.5]}"#).unwrap();
    let engine = EscalationEngine::new(options).unwrap();
    let history = DoseHistory::from_text("10: 0 0 0").unwrap();
    let report = engine.evaluate(&history).unwrap();
    assert_relative_eq!(report.ladder.candidate(), 15.0);
}
