//! The five dose-escalation designs
//!
//! Every rule is a pure function of the [DoseHistory] and the [DoseSequencer]: the
//! "current" dose is the dose given to the most recently treated patient, `n` and `k`
//! are the patient and DLT counts at that dose, and the last two responses are
//! taken across the whole trial in treatment order.
//!
//! | Rule | Decision |
//! |------|----------|
//! | 3+3 | 0/3 advance, 1/3 add 3, ≥2/3 stop, 1/6 advance, ≥2/6 stop (previous dose is MTD) |
//! | Best-of-5 | 0/3, 1/4, 2/5 advance; 1/3, 2/4 add 1; ≥2/3, ≥3/4, ≥3/5 stop |
//! | Up-and-Down | last 0 advance, last 1 de-escalate |
//! | Storer C | last 1 de-escalate; last 0 with n = 1 add 1, with previous 0 advance |
//! | Storer BC | up-and-down until the first DLT, then Storer C; 2 DLTs in a row step down 2 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Action, DoseLadder, DoseSequencer, EscalationDecision, EscalationError};
use crate::data::{DoseHistory, DoseRecord, Response};

/// Dose-escalation design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    ThreePlusThree,
    BestOfFive,
    UpAndDown,
    StorerC,
    StorerBC,
}

impl Rule {
    /// All rules, in report order
    pub const ALL: [Rule; 5] = [
        Rule::ThreePlusThree,
        Rule::BestOfFive,
        Rule::UpAndDown,
        Rule::StorerC,
        Rule::StorerBC,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::ThreePlusThree => "3+3",
            Rule::BestOfFive => "Best-of-5",
            Rule::UpAndDown => "Up-and-Down",
            Rule::StorerC => "Storer C",
            Rule::StorerBC => "Storer BC",
        }
    }

    /// Patients treated per step when the rule moves to a new dose
    pub fn cohort_size(&self) -> usize {
        match self {
            Rule::ThreePlusThree | Rule::BestOfFive => 3,
            Rule::UpAndDown | Rule::StorerC | Rule::StorerBC => 1,
        }
    }

    pub fn evaluate(
        &self,
        history: &DoseHistory,
        sequencer: &DoseSequencer,
    ) -> Result<EscalationDecision, EscalationError> {
        match self {
            Rule::ThreePlusThree => three_plus_three(history, sequencer),
            Rule::BestOfFive => best_of_five(history, sequencer),
            Rule::UpAndDown => up_and_down(history, sequencer),
            Rule::StorerC => storer_c(history, sequencer),
            Rule::StorerBC => storer_bc(history, sequencer),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '+')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "3+3" | "threeplusthree" => Ok(Rule::ThreePlusThree),
            "bestof5" | "bestoffive" => Ok(Rule::BestOfFive),
            "upanddown" | "updown" => Ok(Rule::UpAndDown),
            "storerc" | "c" => Ok(Rule::StorerC),
            "storerbc" | "bc" => Ok(Rule::StorerBC),
            _ => Err(format!("Unknown escalation rule: {}", s)),
        }
    }
}

/// What every rule reads from the history
struct Snapshot<'a> {
    ladder: DoseLadder,
    current: &'a DoseRecord,
    last: Response,
    previous: Option<Response>,
    total_dlts: usize,
}

impl<'a> Snapshot<'a> {
    fn new(history: &'a DoseHistory, sequencer: &DoseSequencer) -> Result<Self, EscalationError> {
        let current = history.current().ok_or(EscalationError::EmptyHistory)?;
        let ladder = sequencer.ladder(history)?;
        let recent = history.last_responses(2);
        let (previous, last) = match recent.as_slice() {
            [last] => (None, *last),
            [previous, last] => (Some(*previous), *last),
            _ => return Err(EscalationError::EmptyHistory),
        };
        Ok(Self {
            ladder,
            current,
            last,
            previous,
            total_dlts: history.dlt_count(),
        })
    }

    fn dose(&self) -> f64 {
        self.current.dose()
    }

    fn counts(&self) -> (usize, usize) {
        (self.current.patient_count(), self.current.response_count())
    }

    fn advance(
        &self,
        rule: Rule,
        rationale: String,
    ) -> Result<EscalationDecision, EscalationError> {
        let next = self.ladder.above(self.dose())?;
        Ok(EscalationDecision::new(rule, Action::Advance, Some(next), rationale))
    }

    fn de_escalate(
        &self,
        rule: Rule,
        steps: usize,
        rationale: String,
    ) -> Result<EscalationDecision, EscalationError> {
        let lower = self.ladder.below(self.dose(), steps)?;
        Ok(EscalationDecision::new(rule, Action::DeEscalate, Some(lower), rationale))
    }

    /// Stop with the dose below the current one as MTD
    ///
    /// When the current dose is the lowest tried, the MTD lies below the ladder and
    /// no dose is recommended.
    fn discontinue(
        &self,
        rule: Rule,
        rationale: String,
    ) -> Result<EscalationDecision, EscalationError> {
        match self.ladder.below(self.dose(), 1) {
            Ok(mtd) => Ok(EscalationDecision::new(
                rule,
                Action::Discontinue,
                Some(mtd),
                format!("{}; MTD is {}", rationale, mtd),
            )),
            Err(EscalationError::NoLowerDose { .. }) => Ok(EscalationDecision::new(
                rule,
                Action::Discontinue,
                None,
                format!("{}; MTD is below the lowest tried dose", rationale),
            )),
            Err(e) => Err(e),
        }
    }

    fn repeat(&self, rule: Rule, additional: usize, rationale: String) -> EscalationDecision {
        EscalationDecision::repeat(rule, self.dose(), additional, rationale)
    }
}

/// Classic 3+3 design
pub fn three_plus_three(
    history: &DoseHistory,
    sequencer: &DoseSequencer,
) -> Result<EscalationDecision, EscalationError> {
    let rule = Rule::ThreePlusThree;
    let s = Snapshot::new(history, sequencer)?;
    let (n, k) = s.counts();
    let observed = format!("{} of {} patients with DLT at {}", k, n, s.dose());
    match (n, k) {
        (3, 0) | (6, 1) => s.advance(rule, observed),
        (3, 1) => Ok(s.repeat(rule, 3, format!("{}; treat 3 more", observed))),
        (3, _) | (6, 2..) => s.discontinue(rule, observed),
        _ => Ok(EscalationDecision::unhandled(
            rule,
            format!("{}; 3+3 only decides after 3 or 6 patients", observed),
        )),
    }
}

/// Best-of-5 design: cohorts of 3 extended one patient at a time up to 5
pub fn best_of_five(
    history: &DoseHistory,
    sequencer: &DoseSequencer,
) -> Result<EscalationDecision, EscalationError> {
    let rule = Rule::BestOfFive;
    let s = Snapshot::new(history, sequencer)?;
    let (n, k) = s.counts();
    let observed = format!("{} of {} patients with DLT at {}", k, n, s.dose());
    match (n, k) {
        (3, 0) | (4, 1) | (5, 2) => s.advance(rule, observed),
        (3, 1) | (4, 2) => Ok(s.repeat(rule, 1, format!("{}; treat 1 more", observed))),
        (3, 2..) | (4, 3..) | (5, 3..) => s.discontinue(rule, observed),
        _ => Ok(EscalationDecision::unhandled(
            rule,
            format!("{}; Best-of-5 has no decision for these counts", observed),
        )),
    }
}

/// Up-and-down design, one patient at a time
///
/// Always defined; the caller decides when the prespecified number of patients
/// has been reached.
pub fn up_and_down(
    history: &DoseHistory,
    sequencer: &DoseSequencer,
) -> Result<EscalationDecision, EscalationError> {
    let rule = Rule::UpAndDown;
    let s = Snapshot::new(history, sequencer)?;
    if s.last.is_dlt() {
        s.de_escalate(rule, 1, format!("last patient at {} had a DLT", s.dose()))
    } else {
        s.advance(rule, format!("last patient at {} had no DLT", s.dose()))
    }
}

/// Storer design C
pub fn storer_c(
    history: &DoseHistory,
    sequencer: &DoseSequencer,
) -> Result<EscalationDecision, EscalationError> {
    let rule = Rule::StorerC;
    let s = Snapshot::new(history, sequencer)?;
    if s.last.is_dlt() {
        s.de_escalate(rule, 1, format!("last patient at {} had a DLT", s.dose()))
    } else {
        storer_c_no_dlt(rule, &s)
    }
}

/// Branching of design C after a patient without DLT
fn storer_c_no_dlt(rule: Rule, s: &Snapshot) -> Result<EscalationDecision, EscalationError> {
    let (n, _) = s.counts();
    if n == 1 {
        return Ok(s.repeat(
            rule,
            1,
            format!("first patient at {} had no DLT; treat 1 more", s.dose()),
        ));
    }
    match s.previous {
        Some(Response::NoToxicity) => s.advance(
            rule,
            format!("last two patients had no DLT, {} patients at {}", n, s.dose()),
        ),
        _ => Ok(EscalationDecision::unhandled(
            rule,
            format!(
                "no DLT after a DLT with {} patients at {}; design C does not cover this case",
                n,
                s.dose()
            ),
        )),
    }
}

/// Storer two-stage design BC
///
/// The stage is derived from the history: stage 1 (up-and-down) lasts until the
/// first DLT, which triggers a de-escalation into stage 2 (design C, stepping down
/// two doses after two consecutive DLTs).
pub fn storer_bc(
    history: &DoseHistory,
    sequencer: &DoseSequencer,
) -> Result<EscalationDecision, EscalationError> {
    let rule = Rule::StorerBC;
    let s = Snapshot::new(history, sequencer)?;

    if s.total_dlts == 0 {
        return s.advance(rule, format!("stage 1: no DLT so far, last dose {}", s.dose()));
    }
    if s.total_dlts == 1 && s.last.is_dlt() {
        return s.de_escalate(
            rule,
            1,
            format!("first DLT at {}; entering stage 2", s.dose()),
        );
    }

    if !s.last.is_dlt() {
        return storer_c_no_dlt(rule, &s);
    }
    match s.previous {
        Some(Response::Toxicity) => s.de_escalate(
            rule,
            2,
            format!("stage 2: two consecutive DLTs, last at {}", s.dose()),
        ),
        _ => s.de_escalate(rule, 1, format!("stage 2: DLT at {}", s.dose())),
    }
}
