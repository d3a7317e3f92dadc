//! Event extraction for BeltCheck.
//!
//! Turns a raw log text into a sequence of typed [`Event`]s using named
//! patterns. Extraction is a pure function of its inputs: rescanning the
//! same text with the same patterns yields the same sequence. Lines that
//! match no pattern are noise and are silently skipped; a token whose
//! numeric capture cannot be parsed is a hard [`ExtractError`], never a
//! silent coercion.
//!
//! [`Event`]: beltcheck_types::Event

pub mod error;
pub mod pattern;
pub mod scanner;

pub use error::ExtractError;
pub use pattern::{builtin_patterns, CaptureShape, EventPattern};
pub use scanner::{Scan, Scanner};
