//! Dose-escalation example
//!
//! Loads a trial in progress, prints every rule's recommendation and then
//! compares the designs by simulation.
//!
//! Run with: `RUST_LOG=debug cargo run --example escalation`

use anyhow::Result;
use pkpd_escalation::prelude::simulator::*;
use pkpd_escalation::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PRIOR: &str = "\
# dose: responses (1 = DLT)
0.05: 0 0 0
0.10: 0 0 0
";

const NEW_COHORT: &str = "0.167: 0 1 0";

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let fmt_layer = fmt::layer().with_target(true).with_filter(env_filter);
    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;
    println!("=== Dose escalation ===\n");

    let prior = DoseHistory::from_text(PRIOR)?;
    let history = DoseHistory::load(Some(&prior), NEW_COHORT)?;
    println!("History:\n{}", history);

    let engine = EscalationEngine::new(EscalationOptions::default())?;
    let report = engine.evaluate(&history)?;
    println!("{}", report);

    println!("Interval table (CSV):");
    report.write_intervals_csv(std::io::stdout())?;
    println!();

    simulation_example()
}

/// Operating characteristics of every design under one logistic curve
fn simulation_example() -> Result<()> {
    println!("--- Operating characteristics, logistic(x0 = 0.3, g = 15) ---\n");
    let simulator = DoseResponseSimulator::from_parameters(ModelKind::Logistic, &[0.3, 15.0])?;
    let options = EscalationOptions::default();

    for rule in Rule::ALL {
        let design = TrialDesign::new(rule, 0.05, 24);
        let oc = operating_characteristics(&simulator, &options, &design, 1000, 2024)?;
        println!(
            "{:<12} patients {:>5.1}  DLTs {:>4.1}  no MTD {:>4}  unhandled {:>4}",
            rule.name(),
            oc.mean_patients,
            oc.mean_dlts,
            oc.no_mtd,
            oc.unhandled
        );
        for selection in &oc.mtd_selection {
            println!(
                "    MTD {:<8.4} p(DLT) {:.3}  selected {:>5.1}%",
                selection.dose,
                selection.probability,
                100.0 * selection.fraction
            );
        }
    }
    Ok(())
}
