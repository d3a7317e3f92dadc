use beltcheck_types::EventKind;

/// Errors produced while extracting events from a log text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("pattern {pattern} matched unparseable number {token:?}")]
    Parse { pattern: EventKind, token: String },

    #[error("pattern {pattern} matched in {source_text:?}, which has no worker context")]
    MissingContext { pattern: EventKind, source_text: String },

    #[error("invalid pattern for {kind}: {reason}")]
    InvalidPattern { kind: EventKind, reason: String },
}
