use beltcheck_types::{ActorId, EventKind};

/// Errors produced by aggregation and invariant evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("{kind} references undeclared actor {actor}")]
    UndeclaredActor { actor: ActorId, kind: EventKind },

    #[error("internal accounting error for {actor}: {reason}")]
    Internal { actor: ActorId, reason: String },

    #[error("invalid config: {0}")]
    Config(String),
}
