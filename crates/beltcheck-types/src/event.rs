use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, Role};

/// Fixed vocabulary of event tokens recognized in conveyor logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A worker put a brick on the belt; the brick's mass equals the
    /// worker's id.
    WorkerInsert,
    /// A truck arrived at the loading zone. Declares the truck as a
    /// consumer before any removal is attributed to it.
    TruckStart,
    /// A truck took a brick of a given mass off the belt.
    TruckRemoval,
    /// A worker process began work. Carries no id of its own.
    WorkerStarted,
    /// A worker process finished work. Carries no id of its own.
    WorkerFinished,
    /// Anonymous insertion into the single unnamed stream.
    Insert,
    /// Anonymous removal from the single unnamed stream.
    Remove,
}

impl EventKind {
    /// The wire token this kind is extracted from.
    pub fn token(&self) -> &'static str {
        match self {
            Self::WorkerInsert => "EVENT_WORKER_INSERT",
            Self::TruckStart => "EVENT_TRUCK_START",
            Self::TruckRemoval => "EVENT_TRUCK_REMOVAL",
            Self::WorkerStarted => "EVENT_WORKER_STARTED",
            Self::WorkerFinished => "EVENT_WORKER_FINISHED",
            Self::Insert => "EVENT_INSERT",
            Self::Remove => "EVENT_REMOVE",
        }
    }

    /// The aggregation role this kind contributes to, if any.
    ///
    /// Lifecycle markers carry no mass and belong to neither role.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::WorkerInsert | Self::Insert => Some(Role::Producer),
            Self::TruckStart | Self::TruckRemoval | Self::Remove => Some(Role::Consumer),
            Self::WorkerStarted | Self::WorkerFinished => None,
        }
    }

    /// Returns `true` for kinds that increment an actor's tallies.
    ///
    /// `TruckStart` declares presence but counts nothing.
    pub fn is_counted(&self) -> bool {
        matches!(
            self,
            Self::WorkerInsert | Self::TruckRemoval | Self::Insert | Self::Remove
        )
    }

    /// Returns `true` for kinds that declare an actor's presence.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Self::TruckStart)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One extracted event occurrence.
///
/// Events are immutable once produced. Ordering among events of the same
/// actor matters only for lifecycle checks; ordering across actors does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Who it happened to.
    pub actor: ActorId,
    /// Mass carried by the event, for kinds that carry one.
    pub magnitude: Option<u64>,
}

impl Event {
    /// Create a new event.
    pub fn new(kind: EventKind, actor: ActorId, magnitude: Option<u64>) -> Self {
        Self {
            kind,
            actor,
            magnitude,
        }
    }

    /// The event's magnitude, defaulting to zero for massless kinds.
    pub fn magnitude_or_zero(&self) -> u64 {
        self.magnitude.unwrap_or(0)
    }
}

/// Explicit identity context for one log source.
///
/// `EVENT_WORKER_STARTED` and `EVENT_WORKER_FINISHED` name no actor in the
/// text; the id of the worker that wrote the log is supplied here by the
/// caller. It is never recovered from the file path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceContext {
    /// Worker id attributed to context-dependent tokens, when known.
    pub worker: Option<u64>,
    /// Human-readable name of the source, used in diagnostics.
    pub label: String,
}

impl SourceContext {
    /// Context for a log written by a known worker.
    pub fn for_worker(id: u64, label: impl Into<String>) -> Self {
        Self {
            worker: Some(id),
            label: label.into(),
        }
    }

    /// Context for a log with no attributable worker.
    pub fn anonymous(label: impl Into<String>) -> Self {
        Self {
            worker: None,
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_wire_forms() {
        assert_eq!(EventKind::WorkerInsert.token(), "EVENT_WORKER_INSERT");
        assert_eq!(EventKind::TruckRemoval.token(), "EVENT_TRUCK_REMOVAL");
        assert_eq!(format!("{}", EventKind::Insert), "EVENT_INSERT");
    }

    #[test]
    fn roles_split_producers_from_consumers() {
        assert_eq!(EventKind::WorkerInsert.role(), Some(Role::Producer));
        assert_eq!(EventKind::TruckRemoval.role(), Some(Role::Consumer));
        assert_eq!(EventKind::WorkerStarted.role(), None);
    }

    #[test]
    fn declarations_are_not_counted() {
        assert!(EventKind::TruckStart.is_declaration());
        assert!(!EventKind::TruckStart.is_counted());
        assert!(EventKind::TruckRemoval.is_counted());
    }

    #[test]
    fn magnitude_defaults_to_zero() {
        let event = Event::new(EventKind::TruckStart, ActorId::Truck(2), None);
        assert_eq!(event.magnitude_or_zero(), 0);
    }

    #[test]
    fn context_constructors() {
        let ctx = SourceContext::for_worker(2, "worker2.log");
        assert_eq!(ctx.worker, Some(2));
        assert_eq!(ctx.label, "worker2.log");
        assert_eq!(SourceContext::anonymous("belt.log").worker, None);
    }
}
