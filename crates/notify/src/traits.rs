//! Gateway trait definitions and shared result types.
//!
//! The engine never speaks a provider protocol itself; it consumes
//! these narrow interfaces and leaves transport details to the
//! surrounding application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use bellman_core::{Channel, RecipientPrefs};

/// Errors that can occur during channel delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("record store failure: {0}")]
    Store(String),

    #[error("gateway failure: {0}")]
    Gateway(String),

    #[error("channel timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Persisted in-app notification record. This is the one channel every
/// enrolled recipient receives, so schedule history is never silently
/// missing for anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InAppRecord {
    pub recipient_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One push notification ready for the push gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushPayload {
    pub token: String,
    pub title: String,
    pub body: String,
    /// Machine-readable context for client-side routing.
    pub data: serde_json::Value,
}

/// One SMS ready for the SMS gateway. No structured data; the body is
/// already capped at the channel limit by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsPayload {
    pub phone: String,
    pub body: String,
}

/// Per-batch outcome from the push gateway.
#[derive(Debug, Clone, Default)]
pub struct PushReport {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Per-batch outcome from the SMS gateway. `limit_exceeded` counts
/// recipients over the provider's sending-rate or budget ceiling and
/// is tracked separately from `failed`.
#[derive(Debug, Clone, Default)]
pub struct SmsReport {
    pub sent: usize,
    pub failed: usize,
    pub limit_exceeded: usize,
    pub errors: Vec<String>,
}

/// Persistence side of the surrounding application.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Recipients enrolled in a course, with their delivery preferences.
    async fn enrolled_recipients(&self, course_id: Uuid) -> Result<Vec<RecipientPrefs>, NotifyError>;

    /// Persist in-app records as a single bulk write. Returns the
    /// number of records written.
    async fn persist_in_app(&self, records: &[InAppRecord]) -> Result<usize, NotifyError>;
}

/// Outbound push provider.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_batch(&self, payloads: &[PushPayload]) -> Result<PushReport, NotifyError>;
}

/// Outbound SMS provider.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_batch(&self, messages: &[SmsPayload]) -> Result<SmsReport, NotifyError>;
}

/// One channel-level failure recorded during dispatch. Kept for
/// logging and observability; never surfaced to end users verbatim.
#[derive(Debug, Clone)]
pub struct ChannelFailure {
    pub channel: Channel,
    pub message: String,
}

/// Aggregated outcome of one dispatch call across all three channels.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    pub in_app_sent: usize,
    pub push_sent: usize,
    pub push_failed: usize,
    pub sms_sent: usize,
    pub sms_failed: usize,
    pub sms_limit_exceeded: usize,
    pub errors: Vec<ChannelFailure>,
}

impl DispatchResult {
    /// Total deliveries that reached a recipient on any channel.
    pub fn total_sent(&self) -> usize {
        self.in_app_sent + self.push_sent + self.sms_sent
    }
}
