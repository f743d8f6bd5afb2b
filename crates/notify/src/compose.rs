//! Per-channel message composition.
//!
//! One change event composes into three renditions: a detailed
//! bulleted body for the persisted in-app record, a one-line summary
//! for push, and a hard-capped SMS body. Structured routing data is
//! attached to push only.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use bellman_core::EventKind;
use bellman_schedule::{ChangeSet, ChangedField};

/// Hard SMS length cap. Bodies over this are truncated to 157
/// characters plus `"..."`.
pub const SMS_MAX_LEN: usize = 160;

/// How many change descriptions a non-cancellation SMS may carry.
const SMS_MAX_CHANGES: usize = 2;

/// Course/activity context attached to every composed message.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageContext<'a> {
    pub kind: EventKind,
    pub course_id: Uuid,
    pub course_name: &'a str,
    /// The changed entity: the course itself for schedule updates, the
    /// quiz/assignment for creation events.
    pub entity_id: Uuid,
}

/// All per-channel renditions of one message for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedMessage {
    pub title: String,
    /// Full greeting + bulleted change list; persisted in-app.
    pub detailed_body: String,
    /// One-line summary for push. Long input is the provider's problem
    /// to clip, never a panic here.
    pub short_body: String,
    /// Capped at [`SMS_MAX_LEN`] characters.
    pub sms_body: String,
    /// Machine-readable context for client-side routing; push only.
    pub structured_data: serde_json::Value,
}

/// Compose the per-channel renditions of a schedule change.
pub fn compose_change(
    changes: &ChangeSet,
    recipient_name: &str,
    context: &MessageContext<'_>,
) -> ComposedMessage {
    let title = change_title(changes);

    let bullets: String = changes
        .descriptions()
        .map(|text| format!("• {text}"))
        .collect::<Vec<_>>()
        .join("\n");
    let detailed_body = format!(
        "Hi {recipient_name},\n\n{} has been updated:\n{bullets}",
        context.course_name
    );

    let short_body = format!(
        "{}: {}",
        context.course_name,
        changes.descriptions().collect::<Vec<_>>().join(", ")
    );

    let sms_body = if changes.is_cancellation {
        truncate_sms(format!(
            "URGENT: {} class CANCELLED.",
            context.course_name
        ))
    } else {
        let clauses = changes
            .descriptions()
            .take(SMS_MAX_CHANGES)
            .collect::<Vec<_>>()
            .join("; ");
        truncate_sms(format!("{}: {clauses}", context.course_name))
    };

    ComposedMessage {
        title,
        detailed_body,
        short_body,
        sms_body,
        structured_data: structured_data(context),
    }
}

/// Compose the renditions of a new-activity announcement (quiz or
/// assignment posted to a course).
pub fn compose_announcement(
    activity_title: &str,
    recipient_name: &str,
    context: &MessageContext<'_>,
) -> ComposedMessage {
    let (title, noun) = match context.kind {
        EventKind::QuizCreated => ("New Quiz".to_string(), "quiz"),
        EventKind::AssignmentCreated => ("New Assignment".to_string(), "assignment"),
        EventKind::CourseUpdated => ("Course Updated".to_string(), "update"),
    };

    let detailed_body = format!(
        "Hi {recipient_name},\n\nA new {noun} \"{activity_title}\" was posted in {}.",
        context.course_name
    );
    let short_body = format!("{}: new {noun} \"{activity_title}\"", context.course_name);
    let sms_body = truncate_sms(format!(
        "{}: new {noun} \"{activity_title}\"",
        context.course_name
    ));

    ComposedMessage {
        title,
        detailed_body,
        short_body,
        sms_body,
        structured_data: structured_data(context),
    }
}

fn change_title(changes: &ChangeSet) -> String {
    if changes.is_cancellation {
        return "Class Cancelled".to_string();
    }
    match changes.primary_field() {
        Some(ChangedField::Time) => "Time Changed",
        Some(ChangedField::Venue) => "Venue Changed",
        Some(ChangedField::Days) => "Class Days Changed",
        Some(ChangedField::Name) | Some(ChangedField::CreditHours) | None => "Course Updated",
    }
    .to_string()
}

fn structured_data(context: &MessageContext<'_>) -> serde_json::Value {
    json!({
        "event": context.kind.to_string(),
        "entity_id": context.entity_id,
        "course_id": context.course_id,
        "course_name": context.course_name,
    })
}

/// Enforce the SMS cap: over-length bodies become 157 characters
/// plus `"..."`.
fn truncate_sms(body: String) -> String {
    if body.chars().count() <= SMS_MAX_LEN {
        return body;
    }
    let mut clipped: String = body.chars().take(SMS_MAX_LEN - 3).collect();
    clipped.push_str("...");
    clipped
}
