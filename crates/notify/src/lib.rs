//! Multi-channel notification dispatch for schedule changes.
//!
//! This crate provides:
//! - Gateway traits for the three delivery channels (in-app record
//!   store, push gateway, SMS gateway)
//! - `AccessGate` channel-eligibility filtering per recipient
//! - `NotificationComposer` per-channel message payloads
//! - `DispatchCoordinator` concurrent fan-out with per-channel
//!   failure isolation and aggregated results
//! - `NotificationEngine` wiring detection, urgency, gating, and
//!   dispatch behind the caller-facing entry points

pub mod access;
pub mod compose;
pub mod dispatcher;
pub mod engine;
pub mod traits;

pub use access::eligible_channels;
pub use compose::{compose_announcement, compose_change, ComposedMessage, MessageContext};
pub use dispatcher::{DispatchCoordinator, DispatchJob, DispatcherConfig};
pub use engine::NotificationEngine;
pub use traits::{
    ChannelFailure, DispatchResult, InAppRecord, NotifyError, PushGateway, PushPayload,
    PushReport, RecordStore, SmsGateway, SmsPayload, SmsReport,
};
