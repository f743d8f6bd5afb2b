//! Shared domain types for the schedule notification engine.
//!
//! This crate defines the vocabulary the other crates speak:
//! - [`Weekday`] and [`TimeRange`] for weekly-recurring schedules
//! - [`ScheduleSnapshot`] / [`CourseSnapshot`] / [`CourseUpdate`] course records
//! - [`RecipientPrefs`] and [`AccessState`] for delivery targets
//! - [`Channel`], [`EventKind`], and [`EventPolicy`] for gating

pub mod course;
pub mod error;
pub mod event;
pub mod recipient;
pub mod weekday;

pub use course::*;
pub use error::*;
pub use event::*;
pub use recipient::*;
pub use weekday::*;
