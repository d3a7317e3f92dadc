//! Foundation types for BeltCheck.
//!
//! This crate provides the actor, role, and event types shared by every
//! other BeltCheck crate. The vocabulary mirrors the textual event tokens
//! the conveyor simulation writes into its logs.
//!
//! # Key Types
//!
//! - [`ActorId`] — Identity of a worker, truck, or the anonymous stream
//! - [`Role`] — Whether an actor adds mass to the belt or removes it
//! - [`EventKind`] — Fixed vocabulary of recognized event tokens
//! - [`Event`] — One extracted, immutable event occurrence
//! - [`SourceContext`] — Explicit per-log identity for context-dependent tokens

pub mod actor;
pub mod event;

pub use actor::{ActorId, Role};
pub use event::{Event, EventKind, SourceContext};
