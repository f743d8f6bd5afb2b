//! Concurrent fan-out across the three delivery channels.
//!
//! The coordinator partitions jobs by channel, runs in-app
//! persistence, the push batch, and the SMS batch concurrently, and
//! aggregates the outcome. Individual channel failures are recorded
//! locally and never abort sibling channels or the caller's own
//! update operation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use bellman_core::{Channel, ChannelSet, RecipientPrefs};

use crate::compose::ComposedMessage;
use crate::traits::{
    ChannelFailure, DispatchResult, InAppRecord, NotifyError, PushGateway, PushPayload,
    RecordStore, SmsGateway, SmsPayload,
};

/// One recipient's unit of work for a single dispatch call. Ephemeral;
/// built at job-construction time and discarded after dispatch.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub recipient: RecipientPrefs,
    pub channels: ChannelSet,
    pub message: ComposedMessage,
    pub is_urgent: bool,
    pub course_id: uuid::Uuid,
    pub occurred_at: DateTime<Utc>,
}

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Push payloads per gateway submission. Providers cap batch
    /// sizes; 500 matches the common FCM limit.
    pub push_chunk_size: usize,
    /// Independent timeout applied to each channel call. A timeout is
    /// recorded like any other delivery failure for that channel.
    pub channel_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            push_chunk_size: 500,
            channel_timeout: Duration::from_secs(10),
        }
    }
}

/// Orchestrates concurrent delivery across in-app, push, and SMS.
pub struct DispatchCoordinator {
    store: Arc<dyn RecordStore>,
    push: Arc<dyn PushGateway>,
    sms: Arc<dyn SmsGateway>,
    config: DispatcherConfig,
}

impl DispatchCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        push: Arc<dyn PushGateway>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self::with_config(store, push, sms, DispatcherConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn RecordStore>,
        push: Arc<dyn PushGateway>,
        sms: Arc<dyn SmsGateway>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            push,
            sms,
            config,
        }
    }

    /// Dispatch a batch of jobs across all three channels.
    ///
    /// The three channel deliveries run concurrently; none depends on
    /// another's result. Partial results are always returned — there
    /// is no cross-channel abort and no retry here. An empty job list
    /// is not an error and returns a zeroed result.
    pub async fn dispatch(&self, jobs: &[DispatchJob]) -> DispatchResult {
        if jobs.is_empty() {
            return DispatchResult::default();
        }

        // Partition by channel, preserving recipient list order for
        // deterministic result correlation.
        let records: Vec<InAppRecord> = jobs
            .iter()
            .filter(|job| job.channels.in_app)
            .filter_map(|job| {
                job.recipient.user_id.map(|recipient_id| InAppRecord {
                    recipient_id,
                    course_id: job.course_id,
                    title: job.message.title.clone(),
                    body: job.message.detailed_body.clone(),
                    created_at: job.occurred_at,
                })
            })
            .collect();

        let push_payloads: Vec<PushPayload> = jobs
            .iter()
            .filter(|job| job.channels.push)
            .filter_map(|job| {
                job.recipient.push_token.as_ref().map(|token| PushPayload {
                    token: token.clone(),
                    title: job.message.title.clone(),
                    body: job.message.short_body.clone(),
                    data: job.message.structured_data.clone(),
                })
            })
            .collect();

        let sms_payloads: Vec<SmsPayload> = jobs
            .iter()
            .filter(|job| job.channels.sms && job.is_urgent)
            .filter_map(|job| {
                job.recipient.phone.as_ref().map(|phone| SmsPayload {
                    phone: phone.clone(),
                    body: job.message.sms_body.clone(),
                })
            })
            .collect();

        let mut result = DispatchResult::default();
        let (in_app, push, sms) = tokio::join!(
            self.deliver_in_app(&records),
            self.deliver_push(&push_payloads),
            self.deliver_sms(&sms_payloads),
        );

        result.in_app_sent = in_app.0;
        if let Some(failure) = in_app.1 {
            result.errors.push(failure);
        }

        result.push_sent = push.0;
        result.push_failed = push.1;
        result.errors.extend(push.2);

        result.sms_sent = sms.0;
        result.sms_failed = sms.1;
        result.sms_limit_exceeded = sms.2;
        result.errors.extend(sms.3);

        tracing::info!(
            in_app = result.in_app_sent,
            push_sent = result.push_sent,
            push_failed = result.push_failed,
            sms_sent = result.sms_sent,
            sms_failed = result.sms_failed,
            sms_limit_exceeded = result.sms_limit_exceeded,
            errors = result.errors.len(),
            "dispatch complete"
        );

        result
    }

    /// Persist the in-app records as one bulk write.
    async fn deliver_in_app(&self, records: &[InAppRecord]) -> (usize, Option<ChannelFailure>) {
        if records.is_empty() {
            return (0, None);
        }

        let attempt = tokio::time::timeout(
            self.config.channel_timeout,
            self.store.persist_in_app(records),
        )
        .await;

        match flatten_timeout(attempt, self.config.channel_timeout) {
            Ok(written) => (written, None),
            Err(e) => {
                tracing::warn!(channel = %Channel::InApp, error = %e, "in-app persistence failed");
                (
                    0,
                    Some(ChannelFailure {
                        channel: Channel::InApp,
                        message: e.to_string(),
                    }),
                )
            }
        }
    }

    /// Submit push payloads in provider-sized chunks. A chunk-level
    /// transport error counts its payloads as failed and the remaining
    /// chunks still go out.
    async fn deliver_push(
        &self,
        payloads: &[PushPayload],
    ) -> (usize, usize, Vec<ChannelFailure>) {
        let mut sent = 0;
        let mut failed = 0;
        let mut failures = Vec::new();

        for chunk in payloads.chunks(self.config.push_chunk_size.max(1)) {
            let attempt =
                tokio::time::timeout(self.config.channel_timeout, self.push.send_batch(chunk))
                    .await;

            match flatten_timeout(attempt, self.config.channel_timeout) {
                Ok(report) => {
                    sent += report.sent;
                    failed += report.failed;
                    failures.extend(report.errors.into_iter().map(|message| ChannelFailure {
                        channel: Channel::Push,
                        message,
                    }));
                }
                Err(e) => {
                    tracing::warn!(channel = %Channel::Push, error = %e, size = chunk.len(), "push chunk failed");
                    failed += chunk.len();
                    failures.push(ChannelFailure {
                        channel: Channel::Push,
                        message: e.to_string(),
                    });
                }
            }
        }

        (sent, failed, failures)
    }

    /// Submit the SMS batch. `limit_exceeded` recipients are a
    /// distinct outcome from failures.
    async fn deliver_sms(
        &self,
        payloads: &[SmsPayload],
    ) -> (usize, usize, usize, Vec<ChannelFailure>) {
        if payloads.is_empty() {
            return (0, 0, 0, Vec::new());
        }

        let attempt =
            tokio::time::timeout(self.config.channel_timeout, self.sms.send_batch(payloads))
                .await;

        match flatten_timeout(attempt, self.config.channel_timeout) {
            Ok(report) => (
                report.sent,
                report.failed,
                report.limit_exceeded,
                report
                    .errors
                    .into_iter()
                    .map(|message| ChannelFailure {
                        channel: Channel::Sms,
                        message,
                    })
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!(channel = %Channel::Sms, error = %e, "sms batch failed");
                (
                    0,
                    payloads.len(),
                    0,
                    vec![ChannelFailure {
                        channel: Channel::Sms,
                        message: e.to_string(),
                    }],
                )
            }
        }
    }
}

/// Collapse a timeout-wrapped gateway result into one error domain.
fn flatten_timeout<T>(
    attempt: Result<Result<T, NotifyError>, tokio::time::error::Elapsed>,
    timeout: Duration,
) -> Result<T, NotifyError> {
    match attempt {
        Ok(inner) => inner,
        Err(_) => Err(NotifyError::Timeout(timeout)),
    }
}
