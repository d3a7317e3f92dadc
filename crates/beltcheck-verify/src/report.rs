use serde::Serialize;

use crate::aggregate::{ActorStats, Aggregates};
use crate::error::VerifyError;
use crate::invariants::{Evaluator, Invariant, Verdict};

/// Complete result of one verification run.
///
/// Carries everything a sink needs to render: per-actor line items for both
/// roles, the verdict sequence, and the sources skipped over I/O problems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub producers: Vec<ActorStats>,
    pub consumers: Vec<ActorStats>,
    pub verdicts: Vec<Verdict>,
    pub skipped_sources: Vec<String>,
}

impl VerificationReport {
    /// Evaluate all invariants over finished aggregates.
    pub fn build(
        aggregates: &Aggregates,
        skipped_sources: Vec<String>,
    ) -> Result<Self, VerifyError> {
        Ok(Self {
            producers: aggregates.produced().values().copied().collect(),
            consumers: aggregates.consumed().values().copied().collect(),
            verdicts: Evaluator::evaluate(aggregates)?,
            skipped_sources,
        })
    }

    /// Returns `true` iff every verdict passed.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    /// The run-wide conservation verdict.
    pub fn conservation(&self) -> Option<&Verdict> {
        self.run_wide(Invariant::Conservation)
    }

    /// The run-wide signed-stream verdict.
    pub fn signed_stream(&self) -> Option<&Verdict> {
        self.run_wide(Invariant::SignedStream)
    }

    /// Per-actor lifecycle verdicts, rollup excluded.
    pub fn lifecycle_verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts
            .iter()
            .filter(|v| v.invariant == Invariant::Lifecycle && v.actor.is_some())
    }

    fn run_wide(&self, invariant: Invariant) -> Option<&Verdict> {
        self.verdicts
            .iter()
            .find(|v| v.invariant == invariant && v.actor.is_none())
    }
}

#[cfg(test)]
mod tests {
    use beltcheck_types::{ActorId, Event, EventKind};

    use crate::config::VerifyConfig;

    use super::*;

    fn scenario_c_report() -> VerificationReport {
        let mut events = vec![Event::new(EventKind::TruckStart, ActorId::Truck(1), None)];
        for _ in 0..3 {
            events.push(Event::new(
                EventKind::WorkerInsert,
                ActorId::Worker(2),
                Some(2),
            ));
            events.push(Event::new(
                EventKind::TruckRemoval,
                ActorId::Truck(1),
                Some(2),
            ));
        }
        let aggregates = Aggregates::from_events(events, &VerifyConfig::default()).unwrap();
        VerificationReport::build(&aggregates, vec![]).unwrap()
    }

    #[test]
    fn scenario_c_report_passes() {
        let report = scenario_c_report();
        assert!(report.passed());
        assert!(report.conservation().unwrap().passed);
        assert!(report.signed_stream().unwrap().passed);
    }

    #[test]
    fn report_lists_both_roles() {
        let report = scenario_c_report();
        // roster workers 1..=3 plus the declared truck
        assert_eq!(report.producers.len(), 3);
        assert_eq!(report.consumers.len(), 1);
        assert_eq!(report.consumers[0].actor, ActorId::Truck(1));
        assert_eq!(report.consumers[0].magnitude, 6);
    }

    #[test]
    fn identical_input_builds_identical_reports() {
        assert_eq!(scenario_c_report(), scenario_c_report());
    }

    #[test]
    fn skipped_sources_are_carried_through() {
        let aggregates =
            Aggregates::from_events([], &VerifyConfig::default()).unwrap();
        let report =
            VerificationReport::build(&aggregates, vec!["worker2.log".into()]).unwrap();
        assert_eq!(report.skipped_sources, vec!["worker2.log".to_string()]);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = scenario_c_report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"verdicts\""));
        assert!(json.contains("conservation"));
    }
}
