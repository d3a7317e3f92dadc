use std::fmt;

use serde::{Deserialize, Serialize};

/// Role an actor plays against the shared conveyor buffer.
///
/// Producers add mass to the belt, consumers remove it. The two roles are
/// tallied independently even when their numeric id spaces overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Adds magnitude into the shared buffer.
    Producer,
    /// Removes magnitude from the shared buffer.
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// Identity of a participant in the simulated pipeline.
///
/// Worker and truck ids come from disjoint tallies, so `Worker(1)` and
/// `Truck(1)` are distinct actors. The anonymous [`ActorId::Stream`] carries
/// the `EVENT_INSERT` / `EVENT_REMOVE` single-stream events, which name no
/// actor of their own.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ActorId {
    /// A producer worker, identified by its numeric id.
    Worker(u64),
    /// A consumer truck, identified by its numeric id.
    Truck(u64),
    /// The single unnamed insert/remove stream.
    Stream,
}

impl ActorId {
    /// The numeric id, if this actor has one.
    pub fn index(&self) -> Option<u64> {
        match self {
            Self::Worker(id) | Self::Truck(id) => Some(*id),
            Self::Stream => None,
        }
    }

    /// Returns `true` for worker actors.
    pub fn is_worker(&self) -> bool {
        matches!(self, Self::Worker(_))
    }

    /// Returns `true` for truck actors.
    pub fn is_truck(&self) -> bool {
        matches!(self, Self::Truck(_))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worker(id) => write!(f, "worker:{id}"),
            Self::Truck(id) => write!(f, "truck:{id}"),
            Self::Stream => write!(f, "stream"),
        }
    }
}
