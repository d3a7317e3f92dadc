use std::fmt;

use serde::Serialize;

use beltcheck_types::ActorId;

use crate::aggregate::Aggregates;
use crate::error::VerifyError;

/// Invariant families evaluated over a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Invariant {
    /// Total mass inserted equals total mass removed.
    Conservation,
    /// The signed insert/remove scalar returns to exactly zero.
    SignedStream,
    /// Every actor that started also finished.
    Lifecycle,
    /// Every declared actor has a tally entry.
    Completeness,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conservation => write!(f, "conservation"),
            Self::SignedStream => write!(f, "signed-stream"),
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::Completeness => write!(f, "completeness"),
        }
    }
}

/// Outcome of one invariant check. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub invariant: Invariant,
    /// Actor the verdict is scoped to; `None` for run-wide verdicts.
    pub actor: Option<ActorId>,
    pub passed: bool,
    pub detail: String,
}

/// Evaluates the registered invariants over finished aggregates.
pub struct Evaluator;

impl Evaluator {
    /// Produce the ordered verdict sequence: conservation, signed stream,
    /// one lifecycle verdict per actor plus a rollup, then completeness.
    ///
    /// One actor's lifecycle violation never suppresses another actor's
    /// verdict.
    pub fn evaluate(aggregates: &Aggregates) -> Result<Vec<Verdict>, VerifyError> {
        let mut verdicts = vec![conservation(aggregates), signed_stream(aggregates)];
        verdicts.extend(lifecycle(aggregates));
        verdicts.push(completeness(aggregates)?);
        Ok(verdicts)
    }
}

fn conservation(aggregates: &Aggregates) -> Verdict {
    let produced = aggregates.producer_total();
    let consumed = aggregates.consumer_total();
    let passed = produced == consumed;
    Verdict {
        invariant: Invariant::Conservation,
        actor: None,
        passed,
        detail: if passed {
            format!("{produced} mass inserted and removed")
        } else {
            format!(
                "inserted {produced}, removed {consumed}, discrepancy {}",
                aggregates.discrepancy()
            )
        },
    }
}

fn signed_stream(aggregates: &Aggregates) -> Verdict {
    let sum = aggregates.signed_sum();
    Verdict {
        invariant: Invariant::SignedStream,
        actor: None,
        passed: sum == 0,
        detail: format!("running sum {sum} (should be 0)"),
    }
}

fn lifecycle(aggregates: &Aggregates) -> Vec<Verdict> {
    let mut verdicts = Vec::new();
    let mut violations = 0u64;

    for (actor, state) in aggregates.lifecycle() {
        let passed = !state.is_violation();
        if !passed {
            violations += 1;
        }
        verdicts.push(Verdict {
            invariant: Invariant::Lifecycle,
            actor: Some(*actor),
            passed,
            detail: match (state.started, state.finished) {
                (true, false) => "started but never finished".into(),
                (true, true) => "started and finished".into(),
                (false, _) => "never started".into(),
            },
        });
    }

    verdicts.push(Verdict {
        invariant: Invariant::Lifecycle,
        actor: None,
        passed: violations == 0,
        detail: if violations == 0 {
            "all workers closed out".into()
        } else {
            format!("{violations} worker(s) started but never finished")
        },
    });

    verdicts
}

fn completeness(aggregates: &Aggregates) -> Result<Verdict, VerifyError> {
    for actor in aggregates.declared() {
        if !aggregates.consumed().contains_key(actor) {
            return Err(VerifyError::Internal {
                actor: *actor,
                reason: "declared actor missing from consumer tallies".into(),
            });
        }
    }
    Ok(Verdict {
        invariant: Invariant::Completeness,
        actor: None,
        passed: true,
        detail: format!(
            "{} declared consumer(s) present in tallies",
            aggregates.declared().len()
        ),
    })
}
