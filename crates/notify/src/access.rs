//! Channel-eligibility filtering per recipient.

use chrono::{DateTime, Utc};

use bellman_core::{ChannelSet, EventPolicy, RecipientPrefs};
use bellman_schedule::Urgency;

/// Decide which channels one recipient is eligible for on one event.
///
/// Returns `None` for recipients with no resolvable identity (a stale
/// enrollment pointing at a deleted account); those are skipped
/// entirely, never treated as an error.
///
/// - In-app is always eligible.
/// - Push needs a registered token, push enabled, and active access
///   when the event policy demands it.
/// - SMS needs a phone number, an urgent event, and active access
///   when the event policy demands it.
pub fn eligible_channels(
    recipient: &RecipientPrefs,
    urgency: &Urgency,
    policy: &EventPolicy,
    now: DateTime<Utc>,
) -> Option<ChannelSet> {
    if !recipient.resolvable() {
        tracing::debug!(name = %recipient.name, "skipping unresolvable recipient");
        return None;
    }

    let has_access = recipient.access.has_active_access(now);

    let push = recipient.push_token.is_some()
        && recipient.push_enabled
        && (!policy.requires_access_for_push || has_access);

    let sms = recipient.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
        && urgency.is_urgent
        && (!policy.requires_access_for_sms || has_access);

    Some(ChannelSet {
        in_app: true,
        push,
        sms,
    })
}
