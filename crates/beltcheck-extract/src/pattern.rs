use regex::Regex;

use beltcheck_types::{ActorId, Event, EventKind, SourceContext};

use crate::error::ExtractError;

/// How a pattern's integer captures map onto an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureShape {
    /// No captures; the actor comes from the source context.
    ContextWorker,
    /// One capture: the actor id, which is also the magnitude. Encodes the
    /// domain convention that a worker's bricks weigh its own id.
    WorkerIdIsMagnitude,
    /// One capture: a truck id, no magnitude.
    TruckId,
    /// Two captures: a truck id, then the magnitude removed.
    TruckIdThenMagnitude,
    /// One capture: the magnitude, attributed to the anonymous stream.
    StreamMagnitude,
}

impl CaptureShape {
    /// Number of capture groups the shape consumes.
    fn group_count(&self) -> usize {
        match self {
            Self::ContextWorker => 0,
            Self::WorkerIdIsMagnitude | Self::TruckId | Self::StreamMagnitude => 1,
            Self::TruckIdThenMagnitude => 2,
        }
    }
}

/// A named, compiled event pattern.
///
/// Binds an [`EventKind`] to a regular expression over the log text and a
/// [`CaptureShape`] describing how the captured integers become an event.
#[derive(Clone, Debug)]
pub struct EventPattern {
    kind: EventKind,
    regex: Regex,
    shape: CaptureShape,
}

impl EventPattern {
    /// Compile a pattern from its textual form.
    ///
    /// Fails if the expression does not compile or declares fewer capture
    /// groups than the shape consumes.
    pub fn new(kind: EventKind, pattern: &str, shape: CaptureShape) -> Result<Self, ExtractError> {
        let regex = Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            kind,
            reason: e.to_string(),
        })?;
        // captures_len includes the implicit whole-match group 0
        if regex.captures_len() < shape.group_count() + 1 {
            return Err(ExtractError::InvalidPattern {
                kind,
                reason: format!(
                    "expression has {} capture group(s), shape needs {}",
                    regex.captures_len() - 1,
                    shape.group_count()
                ),
            });
        }
        Ok(Self { kind, regex, shape })
    }

    /// The event kind this pattern extracts.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The compiled expression.
    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Build an event from one match of this pattern.
    pub(crate) fn event_from(
        &self,
        caps: &regex::Captures<'_>,
        context: &SourceContext,
    ) -> Result<Event, ExtractError> {
        match self.shape {
            CaptureShape::ContextWorker => {
                let id = context
                    .worker
                    .ok_or_else(|| ExtractError::MissingContext {
                        pattern: self.kind,
                        source_text: context.label.clone(),
                    })?;
                Ok(Event::new(self.kind, ActorId::Worker(id), None))
            }
            CaptureShape::WorkerIdIsMagnitude => {
                let id = self.parse_group(caps, 1)?;
                Ok(Event::new(self.kind, ActorId::Worker(id), Some(id)))
            }
            CaptureShape::TruckId => {
                let id = self.parse_group(caps, 1)?;
                Ok(Event::new(self.kind, ActorId::Truck(id), None))
            }
            CaptureShape::TruckIdThenMagnitude => {
                let id = self.parse_group(caps, 1)?;
                let magnitude = self.parse_group(caps, 2)?;
                Ok(Event::new(self.kind, ActorId::Truck(id), Some(magnitude)))
            }
            CaptureShape::StreamMagnitude => {
                let magnitude = self.parse_group(caps, 1)?;
                Ok(Event::new(self.kind, ActorId::Stream, Some(magnitude)))
            }
        }
    }

    fn parse_group(&self, caps: &regex::Captures<'_>, group: usize) -> Result<u64, ExtractError> {
        let token = caps.get(group).map(|m| m.as_str()).unwrap_or_default();
        token.parse::<u64>().map_err(|_| ExtractError::Parse {
            pattern: self.kind,
            token: token.to_string(),
        })
    }
}

/// The built-in wire vocabulary of the conveyor simulation.
pub fn builtin_patterns() -> Vec<EventPattern> {
    [
        (
            EventKind::WorkerInsert,
            r"EVENT_WORKER_INSERT\(([0-9]+)\)",
            CaptureShape::WorkerIdIsMagnitude,
        ),
        (
            EventKind::TruckStart,
            r"EVENT_TRUCK_START\(([0-9]+)\)",
            CaptureShape::TruckId,
        ),
        (
            EventKind::TruckRemoval,
            r"EVENT_TRUCK_REMOVAL\(([0-9]+),([0-9]+)\)",
            CaptureShape::TruckIdThenMagnitude,
        ),
        (
            EventKind::WorkerStarted,
            r"EVENT_WORKER_STARTED",
            CaptureShape::ContextWorker,
        ),
        (
            EventKind::WorkerFinished,
            r"EVENT_WORKER_FINISHED",
            CaptureShape::ContextWorker,
        ),
        (
            EventKind::Insert,
            r"EVENT_INSERT\(([0-9]+)\)",
            CaptureShape::StreamMagnitude,
        ),
        (
            EventKind::Remove,
            r"EVENT_REMOVE\(([0-9]+)\)",
            CaptureShape::StreamMagnitude,
        ),
    ]
    .into_iter()
    .map(|(kind, pattern, shape)| {
        EventPattern::new(kind, pattern, shape).unwrap() // literals are known-good
    })
    .collect()
}
