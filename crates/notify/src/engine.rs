//! Caller-facing entry points wiring detection, urgency, gating,
//! composition, and dispatch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bellman_core::{CourseSnapshot, CourseUpdate, EventKind, EventPolicy, RecipientPrefs};
use bellman_schedule::{classify, detect_changes, next_occurrence, Urgency};

use crate::access::eligible_channels;
use crate::compose::{compose_announcement, compose_change, MessageContext};
use crate::dispatcher::{DispatchCoordinator, DispatchJob};
use crate::traits::DispatchResult;

/// Top-level notification engine.
///
/// Holds the dispatch coordinator plus the per-event-type access
/// policies. Policies default to the per-kind behavior of
/// [`EventKind::default_policy`] and can be overridden per kind.
pub struct NotificationEngine {
    coordinator: DispatchCoordinator,
    policies: HashMap<EventKind, EventPolicy>,
}

impl NotificationEngine {
    pub fn new(coordinator: DispatchCoordinator) -> Self {
        Self {
            coordinator,
            policies: HashMap::new(),
        }
    }

    /// Override the access policy for one event kind.
    pub fn with_policy(mut self, kind: EventKind, policy: EventPolicy) -> Self {
        self.policies.insert(kind, policy);
        self
    }

    fn policy_for(&self, kind: EventKind) -> EventPolicy {
        self.policies
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_policy())
    }

    /// Handle a course schedule update.
    ///
    /// Invoked synchronously from the caller's update handling; the
    /// returned counts are informational only. An update that changes
    /// nothing dispatches nothing. Never fails for business-level
    /// conditions — no recipients, no resolvable time, or a gateway
    /// outage all come back as a structured result.
    pub async fn on_schedule_updated(
        &self,
        before: &CourseSnapshot,
        update: &CourseUpdate,
        recipients: &[RecipientPrefs],
        now: DateTime<Utc>,
    ) -> DispatchResult {
        let changes = detect_changes(before, update);
        if changes.is_empty() {
            tracing::debug!(course = %before.name, "update changed nothing, skipping dispatch");
            return DispatchResult::default();
        }

        let after = before.apply(update);
        // Urgency is schedule-derived, so it is computed once here and
        // reused for every recipient.
        let urgency = classify(next_occurrence(&after.schedule, now), now);

        tracing::info!(
            course = %after.name,
            changes = changes.entries.len(),
            cancellation = changes.is_cancellation,
            urgent = urgency.is_urgent,
            minutes_until = urgency.minutes_until,
            recipients = recipients.len(),
            "dispatching schedule change"
        );

        let context = MessageContext {
            kind: EventKind::CourseUpdated,
            course_id: after.id,
            course_name: &after.name,
            entity_id: after.id,
        };

        let jobs = self.build_jobs(recipients, &urgency, EventKind::CourseUpdated, after.id, now, |name| {
            compose_change(&changes, name, &context)
        });

        self.coordinator.dispatch(&jobs).await
    }

    /// Handle a new quiz or assignment posted to a course.
    ///
    /// Urgency still derives from the course's next occurrence, so an
    /// activity posted minutes before class goes out over SMS too
    /// (policy permitting).
    pub async fn on_activity_posted(
        &self,
        kind: EventKind,
        course: &CourseSnapshot,
        activity_id: Uuid,
        activity_title: &str,
        recipients: &[RecipientPrefs],
        now: DateTime<Utc>,
    ) -> DispatchResult {
        let urgency = classify(next_occurrence(&course.schedule, now), now);

        tracing::info!(
            course = %course.name,
            event = %kind,
            activity = %activity_title,
            urgent = urgency.is_urgent,
            recipients = recipients.len(),
            "dispatching activity announcement"
        );

        let context = MessageContext {
            kind,
            course_id: course.id,
            course_name: &course.name,
            entity_id: activity_id,
        };

        let jobs = self.build_jobs(recipients, &urgency, kind, course.id, now, |name| {
            compose_announcement(activity_title, name, &context)
        });

        self.coordinator.dispatch(&jobs).await
    }

    fn build_jobs<F>(
        &self,
        recipients: &[RecipientPrefs],
        urgency: &Urgency,
        kind: EventKind,
        course_id: Uuid,
        now: DateTime<Utc>,
        compose: F,
    ) -> Vec<DispatchJob>
    where
        F: Fn(&str) -> crate::compose::ComposedMessage,
    {
        let policy = self.policy_for(kind);

        recipients
            .iter()
            .filter_map(|recipient| {
                let channels = eligible_channels(recipient, urgency, &policy, now)?;
                Some(DispatchJob {
                    message: compose(&recipient.name),
                    recipient: recipient.clone(),
                    channels,
                    is_urgent: urgency.is_urgent,
                    course_id,
                    occurred_at: now,
                })
            })
            .collect()
    }
}
