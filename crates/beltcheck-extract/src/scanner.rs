use tracing::debug;

use beltcheck_types::{Event, EventKind, SourceContext};

use crate::error::ExtractError;
use crate::pattern::{builtin_patterns, EventPattern};

/// Extracts typed events from raw log text.
///
/// The scanner walks the text once per pattern, yielding each pattern's
/// matches in left-to-right, non-overlapping order. Scanning has no side
/// effects; the same text and context always produce the same sequence.
#[derive(Clone, Debug)]
pub struct Scanner {
    patterns: Vec<EventPattern>,
}

impl Scanner {
    /// A scanner over an explicit pattern set.
    pub fn new(patterns: Vec<EventPattern>) -> Self {
        Self { patterns }
    }

    /// A scanner over the full built-in conveyor vocabulary.
    pub fn with_builtin_patterns() -> Self {
        Self::new(builtin_patterns())
    }

    /// A scanner over the built-in patterns restricted to `kinds`.
    pub fn only(kinds: &[EventKind]) -> Self {
        Self::new(
            builtin_patterns()
                .into_iter()
                .filter(|p| kinds.contains(&p.kind()))
                .collect(),
        )
    }

    /// The patterns this scanner applies.
    pub fn patterns(&self) -> &[EventPattern] {
        &self.patterns
    }

    /// Lazily scan `text`, yielding events as matches are found.
    pub fn scan<'s>(&'s self, text: &'s str, context: &'s SourceContext) -> Scan<'s> {
        Scan {
            text,
            context,
            remaining: self.patterns.iter(),
            current: None,
        }
    }

    /// Scan `text` to completion, failing on the first malformed capture.
    pub fn extract_all(
        &self,
        text: &str,
        context: &SourceContext,
    ) -> Result<Vec<Event>, ExtractError> {
        let events = self.scan(text, context).collect::<Result<Vec<_>, _>>()?;
        debug!(
            source = %context.label,
            count = events.len(),
            "extracted events"
        );
        Ok(events)
    }
}

/// Lazy event iterator returned by [`Scanner::scan`].
pub struct Scan<'s> {
    text: &'s str,
    context: &'s SourceContext,
    remaining: std::slice::Iter<'s, EventPattern>,
    current: Option<(&'s EventPattern, regex::CaptureMatches<'s, 's>)>,
}

impl Iterator for Scan<'_> {
    type Item = Result<Event, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((pattern, mut matches)) = self.current.take() {
                if let Some(caps) = matches.next() {
                    let item = pattern.event_from(&caps, self.context);
                    self.current = Some((pattern, matches));
                    return Some(item);
                }
            } else {
                let pattern = self.remaining.next()?;
                self.current = Some((pattern, pattern.regex().captures_iter(self.text)));
            }
        }
    }
}
