//! Tests for history ingestion and the persisted text format

use pkpd_escalation::prelude::data::*;

const TRIAL: &str = "\
0.05: 0 0 0
0.10: 0 1 0
0.10: 0 0 0
0.167: 1 0 1
";

#[test]
fn test_text_round_trip() {
    let history = DoseHistory::from_text(TRIAL).unwrap();
    let reloaded = DoseHistory::from_text(&history.to_text()).unwrap();

    assert_eq!(reloaded.records(), history.records());
    assert_eq!(reloaded.treatments(), history.treatments());
}

#[test]
fn test_round_trip_keeps_revisited_doses_in_order() {
    let history = DoseHistory::from_text("1: 0\n2: 1\n1: 0\n2: 0\n").unwrap();
    let text = history.to_text();
    assert_eq!(text, "1: 0\n2: 1\n1: 0\n2: 0\n");
    assert_eq!(DoseHistory::from_text(&text).unwrap(), history);
}

#[test]
fn test_doses_are_unique_after_ingestion() {
    let text = "0.05: 0\n0.0500000001: 1\n0.1: 0\n0.05: 0\n0.1000000002: 1\n";
    let history = DoseHistory::load(None, text).unwrap();
    assert_eq!(history.len(), 2);

    let records = history.records();
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            assert!((a.dose() - b.dose()).abs() > DOSE_TOLERANCE);
        }
    }
    assert_eq!(history.patient_count(), 5);
}

#[test]
fn test_prior_history_is_copied_not_shared() {
    let prior = DoseHistory::from_text("0.05: 0 0 0").unwrap();
    let first = DoseHistory::load(Some(&prior), "0.10: 0 0 0").unwrap();
    let second = DoseHistory::load(Some(&prior), "0.05: 1").unwrap();

    assert_eq!(prior.patient_count(), 3);
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert_eq!(second.records()[0].response_count(), 1);
}

#[test]
fn test_parse_error_aborts_ingestion() {
    let err = DoseHistory::load(None, "0.05: 0 0 0\n0.10: 0 yes 0\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidResponse {
            line: 2,
            token: "yes".to_string()
        }
    );
    assert!(err.to_string().contains("Line 2"));
}

#[test]
fn test_builder_matches_text() {
    let built = DoseHistory::builder()
        .cohort(0.05, &[0, 0, 0])
        .cohort(0.10, &[0, 1, 0])
        .cohort(0.10, &[0, 0, 0])
        .cohort(0.167, &[1, 0, 1])
        .build()
        .unwrap();
    assert_eq!(built, DoseHistory::from_text(TRIAL).unwrap());
}
