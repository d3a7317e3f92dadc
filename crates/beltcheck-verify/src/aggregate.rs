use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use beltcheck_types::{ActorId, Event, EventKind};

use crate::config::VerifyConfig;
use crate::error::VerifyError;

/// Running totals for a single actor in a single role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActorStats {
    pub actor: ActorId,
    /// Number of counted events observed.
    pub events: u64,
    /// Total mass moved by those events.
    pub magnitude: u64,
}

impl ActorStats {
    fn new(actor: ActorId) -> Self {
        Self {
            actor,
            events: 0,
            magnitude: 0,
        }
    }

    fn record(&mut self, magnitude: u64) {
        self.events += 1;
        self.magnitude += magnitude;
    }

    fn absorb(&mut self, other: &ActorStats) {
        self.events += other.events;
        self.magnitude += other.magnitude;
    }
}

/// Start/finish flags derived for one worker-like actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleState {
    pub started: bool,
    pub finished: bool,
}

impl LifecycleState {
    /// An actor that started must also finish. Never-started is not a
    /// violation.
    pub fn is_violation(&self) -> bool {
        self.started && !self.finished
    }
}

/// Per-actor tallies and lifecycle flags accumulated from event streams.
///
/// Aggregation is commutative and associative over event order: partial
/// aggregates from independently parsed logs combine with [`merge`] by
/// summation, and the declaration-before-use check is deferred to
/// [`check_declarations`] because declarations and uses may live in
/// different files.
///
/// [`merge`]: Aggregates::merge
/// [`check_declarations`]: Aggregates::check_declarations
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregates {
    produced: BTreeMap<ActorId, ActorStats>,
    consumed: BTreeMap<ActorId, ActorStats>,
    declared: BTreeSet<ActorId>,
    lifecycle: BTreeMap<ActorId, LifecycleState>,
    signed_sum: i128,
}

impl Aggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a complete event sequence and run the declaration check.
    pub fn from_events<I>(events: I, config: &VerifyConfig) -> Result<Self, VerifyError>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut aggregates = Self::new();
        aggregates.seed_roster(&config.roster);
        for event in events {
            aggregates.ingest(&event);
        }
        aggregates.check_declarations(config)?;
        Ok(aggregates)
    }

    /// Ensure every roster worker is reported even with zero production.
    pub fn seed_roster(&mut self, roster: &[u64]) {
        for &id in roster {
            let actor = ActorId::Worker(id);
            self.produced
                .entry(actor)
                .or_insert_with(|| ActorStats::new(actor));
            self.lifecycle.entry(actor).or_default();
        }
    }

    /// Fold one event into the tallies. Counts and totals only increase.
    pub fn ingest(&mut self, event: &Event) {
        match event.kind {
            EventKind::WorkerInsert | EventKind::Insert => {
                let magnitude = event.magnitude_or_zero();
                self.produced
                    .entry(event.actor)
                    .or_insert_with(|| ActorStats::new(event.actor))
                    .record(magnitude);
                self.signed_sum += i128::from(magnitude);
            }
            EventKind::TruckRemoval | EventKind::Remove => {
                let magnitude = event.magnitude_or_zero();
                self.consumed
                    .entry(event.actor)
                    .or_insert_with(|| ActorStats::new(event.actor))
                    .record(magnitude);
                self.signed_sum -= i128::from(magnitude);
            }
            EventKind::TruckStart => {
                self.declared.insert(event.actor);
                self.consumed
                    .entry(event.actor)
                    .or_insert_with(|| ActorStats::new(event.actor));
            }
            EventKind::WorkerStarted => {
                self.lifecycle.entry(event.actor).or_default().started = true;
            }
            EventKind::WorkerFinished => {
                self.lifecycle.entry(event.actor).or_default().finished = true;
            }
        }
    }

    /// Merge a partial aggregate from another log into this one.
    pub fn merge(&mut self, other: Aggregates) {
        for (actor, stats) in other.produced {
            self.produced
                .entry(actor)
                .or_insert_with(|| ActorStats::new(actor))
                .absorb(&stats);
        }
        for (actor, stats) in other.consumed {
            self.consumed
                .entry(actor)
                .or_insert_with(|| ActorStats::new(actor))
                .absorb(&stats);
        }
        self.declared.extend(other.declared);
        for (actor, state) in other.lifecycle {
            let entry = self.lifecycle.entry(actor).or_default();
            entry.started |= state.started;
            entry.finished |= state.finished;
        }
        self.signed_sum += other.signed_sum;
    }

    /// Deferred declaration-before-use check.
    ///
    /// Every truck with removals must have been declared by a truck start
    /// somewhere in the merged log set. A miss fails the run, unless the
    /// config tolerates undeclared actors.
    pub fn check_declarations(&self, config: &VerifyConfig) -> Result<(), VerifyError> {
        if config.tolerate_undeclared {
            return Ok(());
        }
        for (actor, stats) in &self.consumed {
            if actor.is_truck() && stats.events > 0 && !self.declared.contains(actor) {
                debug!(%actor, events = stats.events, "removals reference undeclared truck");
                return Err(VerifyError::UndeclaredActor {
                    actor: *actor,
                    kind: EventKind::TruckRemoval,
                });
            }
        }
        Ok(())
    }

    /// Producer tallies, keyed by actor.
    pub fn produced(&self) -> &BTreeMap<ActorId, ActorStats> {
        &self.produced
    }

    /// Consumer tallies, keyed by actor.
    pub fn consumed(&self) -> &BTreeMap<ActorId, ActorStats> {
        &self.consumed
    }

    /// Lifecycle flags, keyed by actor.
    pub fn lifecycle(&self) -> &BTreeMap<ActorId, LifecycleState> {
        &self.lifecycle
    }

    /// Actors declared by a start event.
    pub fn declared(&self) -> &BTreeSet<ActorId> {
        &self.declared
    }

    /// Total mass inserted across all producers.
    pub fn producer_total(&self) -> u128 {
        self.produced
            .values()
            .map(|s| u128::from(s.magnitude))
            .sum()
    }

    /// Total mass removed across all consumers.
    pub fn consumer_total(&self) -> u128 {
        self.consumed
            .values()
            .map(|s| u128::from(s.magnitude))
            .sum()
    }

    /// Inserted minus removed mass.
    pub fn discrepancy(&self) -> i128 {
        self.producer_total() as i128 - self.consumer_total() as i128
    }

    /// The running signed scalar: inserts add, removals subtract.
    pub fn signed_sum(&self) -> i128 {
        self.signed_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, actor: ActorId, magnitude: Option<u64>) -> Event {
        Event::new(kind, actor, magnitude)
    }

    fn scenario_c() -> Vec<Event> {
        let mut events = vec![event(EventKind::TruckStart, ActorId::Truck(1), None)];
        for _ in 0..3 {
            events.push(event(EventKind::WorkerInsert, ActorId::Worker(2), Some(2)));
            events.push(event(EventKind::TruckRemoval, ActorId::Truck(1), Some(2)));
        }
        events
    }

    #[test]
    fn scenario_c_balances() {
        let config = VerifyConfig::default();
        let aggregates = Aggregates::from_events(scenario_c(), &config).unwrap();

        let worker = aggregates.produced().get(&ActorId::Worker(2)).unwrap();
        assert_eq!(worker.events, 3);
        assert_eq!(worker.magnitude, 6);

        let truck = aggregates.consumed().get(&ActorId::Truck(1)).unwrap();
        assert_eq!(truck.events, 3);
        assert_eq!(truck.magnitude, 6);

        assert_eq!(aggregates.discrepancy(), 0);
        assert_eq!(aggregates.signed_sum(), 0);
    }

    #[test]
    fn roster_workers_appear_with_zero_counts() {
        let config = VerifyConfig::default();
        let aggregates = Aggregates::from_events([], &config).unwrap();

        for id in [1, 2, 3] {
            let stats = aggregates.produced().get(&ActorId::Worker(id)).unwrap();
            assert_eq!(stats.events, 0);
            assert_eq!(stats.magnitude, 0);
        }
    }

    #[test]
    fn declared_truck_appears_before_any_removal() {
        let config = VerifyConfig::default();
        let events = [event(EventKind::TruckStart, ActorId::Truck(4), None)];
        let aggregates = Aggregates::from_events(events, &config).unwrap();

        let truck = aggregates.consumed().get(&ActorId::Truck(4)).unwrap();
        assert_eq!(truck.events, 0);
        assert_eq!(truck.magnitude, 0);
    }

    #[test]
    fn undeclared_truck_removal_is_rejected() {
        let config = VerifyConfig::default();
        let events = [event(EventKind::TruckRemoval, ActorId::Truck(9), Some(5))];
        let err = Aggregates::from_events(events, &config).unwrap_err();
        assert_eq!(
            err,
            VerifyError::UndeclaredActor {
                actor: ActorId::Truck(9),
                kind: EventKind::TruckRemoval,
            }
        );
    }

    #[test]
    fn tolerate_mode_accepts_undeclared_trucks() {
        let config = VerifyConfig {
            tolerate_undeclared: true,
            ..Default::default()
        };
        let events = [event(EventKind::TruckRemoval, ActorId::Truck(9), Some(5))];
        let aggregates = Aggregates::from_events(events, &config).unwrap();
        assert_eq!(aggregates.consumer_total(), 5);
    }

    #[test]
    fn declaration_in_another_file_satisfies_the_check() {
        let config = VerifyConfig::default();

        let mut removals = Aggregates::new();
        removals.ingest(&event(EventKind::TruckRemoval, ActorId::Truck(1), Some(3)));
        assert!(removals.check_declarations(&config).is_err());

        let mut starts = Aggregates::new();
        starts.ingest(&event(EventKind::TruckStart, ActorId::Truck(1), None));

        let mut merged = Aggregates::new();
        merged.merge(removals);
        merged.merge(starts);
        assert!(merged.check_declarations(&config).is_ok());
    }

    #[test]
    fn merge_order_does_not_change_totals() {
        let events = scenario_c();
        let (left, right) = events.split_at(3);

        let mut a = Aggregates::new();
        for e in left {
            a.ingest(e);
        }
        let mut b = Aggregates::new();
        for e in right {
            b.ingest(e);
        }

        let mut forward = Aggregates::new();
        forward.merge(a.clone());
        forward.merge(b.clone());

        let mut backward = Aggregates::new();
        backward.merge(b);
        backward.merge(a);

        assert_eq!(forward, backward);
    }

    #[test]
    fn lifecycle_flags_or_together_across_files() {
        let mut started = Aggregates::new();
        started.ingest(&event(EventKind::WorkerStarted, ActorId::Worker(1), None));

        let mut finished = Aggregates::new();
        finished.ingest(&event(EventKind::WorkerFinished, ActorId::Worker(1), None));

        let mut merged = Aggregates::new();
        merged.merge(started);
        merged.merge(finished);

        let state = merged.lifecycle().get(&ActorId::Worker(1)).unwrap();
        assert!(state.started && state.finished);
        assert!(!state.is_violation());
    }

    #[test]
    fn reaggregating_identical_input_is_idempotent() {
        let config = VerifyConfig::default();
        let first = Aggregates::from_events(scenario_c(), &config).unwrap();
        let second = Aggregates::from_events(scenario_c(), &config).unwrap();
        assert_eq!(first, second);
    }
}
