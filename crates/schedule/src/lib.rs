//! Temporal reasoning and diffing for weekly course schedules.
//!
//! This crate provides:
//! - [`occurrence`] — when does a recurring class next fire
//! - [`urgency`] — is a change imminent relative to that occurrence
//! - [`change`] — what changed between two course snapshots
//!
//! Everything here is pure and synchronous: `now` is always threaded
//! in as a parameter, never read from the wall clock.

pub mod change;
pub mod occurrence;
pub mod urgency;

pub use change::{detect_changes, ChangeEntry, ChangeSet, ChangedField};
pub use occurrence::next_occurrence;
pub use urgency::{classify, Urgency};
