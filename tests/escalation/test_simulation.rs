//! Simulator tests with scripted uniform draws

use pkpd_escalation::prelude::simulator::*;
use pkpd_escalation::prelude::*;
use pkpd_escalation::SimulationError;

#[test]
fn test_logistic_midpoint_thresholds() {
    let simulator =
        DoseResponseSimulator::from_parameters(ModelKind::Logistic, &[0.0, 1.0]).unwrap();
    let mut history = DoseHistory::new();
    let mut draws = ReplayDraws::new(vec![0.49, 0.51]);
    let simulated = simulator
        .simulate(&[0.0, 0.0, 2.0, 4.0], &mut draws, &mut history)
        .unwrap();

    // X = 0 sits on the midpoint and is drawn, but a zero dose is not recorded
    assert_eq!(simulated[0].probability, 0.5);
    assert_eq!(simulated[0].response, Response::Toxicity);
    assert_eq!(simulated[1].response, Response::NoToxicity);
    assert!(!simulated[0].recorded && !simulated[1].recorded);
    assert_eq!(history.sorted_doses(), vec![2.0, 4.0]);
}

#[test]
fn test_log_dose_midpoint() {
    let model = DoseResponseModel::new(ModelKind::Logistic, &[0.0, 1.0])
        .unwrap()
        .with_log_dose(true);
    let simulator = DoseResponseSimulator::new(model);
    let mut history = DoseHistory::new();
    let mut draws = ReplayDraws::new(vec![0.49, 0.51]);
    let simulated = simulator
        .simulate(&[1.0, 1.0], &mut draws, &mut history)
        .unwrap();

    assert_eq!(simulated[0].probability, 0.5);
    assert_eq!(
        history.records()[0].responses(),
        &[Response::Toxicity, Response::NoToxicity]
    );
}

#[test]
fn test_simulated_history_feeds_the_engine() {
    let simulator =
        DoseResponseSimulator::from_parameters(ModelKind::Sigmoid, &[10.0, 4.0]).unwrap();
    let mut history = DoseHistory::new();
    let mut draws = ReplayDraws::new(vec![0.9]);
    simulator
        .simulate(&[1.0, 1.0, 1.0], &mut draws, &mut history)
        .unwrap();

    let report = EscalationEngine::new(EscalationOptions::default())
        .unwrap()
        .evaluate(&history)
        .unwrap();
    let d = report.get(Rule::ThreePlusThree).unwrap().as_ref().unwrap();
    assert_eq!(d.action, Action::Advance);
    assert_eq!(d.dose, Some(2.0));
}

#[test]
fn test_wrong_arity_is_rejected() {
    let err = DoseResponseSimulator::from_parameters(ModelKind::Gompertz, &[1.0]).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::ParameterCountMismatch {
            expected: 3,
            found: 1,
            ..
        }
    ));
    let err: PkpdError = err.into();
    assert!(err.to_string().contains("3 parameter(s)"));
}

#[test]
fn test_closed_loop_storer_bc() {
    let simulator =
        DoseResponseSimulator::from_parameters(ModelKind::Logistic, &[3.0, 20.0]).unwrap();
    let design = TrialDesign::new(Rule::StorerBC, 1.0, 12);
    let mut draws = ReplayDraws::new(vec![0.5]);
    let options = EscalationOptions::default();
    let outcome = simulate_trial(&simulator, &options, &design, &mut draws).unwrap();

    // 1.0 and 2.0 are safe, 3.34 is toxic: escalate, then step back to 2.0
    let actions: Vec<Action> = outcome.decisions.iter().map(|d| d.action).collect();
    assert_eq!(actions[..3], [Action::Advance, Action::Advance, Action::DeEscalate]);
    assert_eq!(outcome.decisions[2].dose, Some(2.0));
    assert!(outcome.history.patient_count() <= 12);
}

#[test]
fn test_operating_characteristics_select_safe_dose() {
    let simulator =
        DoseResponseSimulator::from_parameters(ModelKind::Logistic, &[3.0, 20.0]).unwrap();
    let design = TrialDesign::new(Rule::ThreePlusThree, 1.0, 30);
    let options = EscalationOptions::default();
    let oc = operating_characteristics(&simulator, &options, &design, 50, 1).unwrap();

    // The curve is a near step, so every replicate picks 2.0
    assert_eq!(oc.replicates, 50);
    assert_eq!(oc.mtd_selection.len(), 1);
    assert_eq!(oc.mtd_selection[0].dose, 2.0);
    assert_eq!(oc.mtd_selection[0].count, 50);
    assert_eq!(oc.discontinued, 50);
}
