//! Imminence classification for a detected change.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A change is urgent when the next occurrence is at most this many
/// minutes away. Urgency is the single gate deciding whether SMS, the
/// highest-cost channel, is attempted at all.
pub const URGENT_WINDOW_MINUTES: i64 = 30;

/// How imminent the next occurrence is relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Urgency {
    pub is_urgent: bool,
    /// Rounded minutes until the next occurrence; `None` when there is
    /// no occurrence in the horizon.
    pub minutes_until: Option<i64>,
}

impl Urgency {
    pub fn not_urgent() -> Self {
        Self {
            is_urgent: false,
            minutes_until: None,
        }
    }
}

/// Classify a change event's urgency.
///
/// Urgent iff the occurrence is strictly in the future and no more
/// than [`URGENT_WINDOW_MINUTES`] away. A class that already started
/// is never urgent here; the grace window belongs to the occurrence
/// calculator, not this classifier. Computed once per change event
/// and reused for every recipient, since the occurrence time is
/// schedule-derived, not recipient-derived.
pub fn classify(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Urgency {
    let Some(next) = next else {
        return Urgency::not_urgent();
    };

    let delta = next.signed_duration_since(now);
    let minutes = round_minutes(delta);

    Urgency {
        is_urgent: delta > Duration::zero() && delta <= Duration::minutes(URGENT_WINDOW_MINUTES),
        minutes_until: Some(minutes),
    }
}

fn round_minutes(delta: Duration) -> i64 {
    let secs = delta.num_seconds();
    if secs >= 0 {
        (secs + 30) / 60
    } else {
        (secs - 30) / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn thirty_minutes_out_is_urgent() {
        let urgency = classify(Some(now() + Duration::minutes(30)), now());
        assert!(urgency.is_urgent);
        assert_eq!(urgency.minutes_until, Some(30));
    }

    #[test]
    fn thirty_one_minutes_out_is_not_urgent() {
        let urgency = classify(Some(now() + Duration::minutes(31)), now());
        assert!(!urgency.is_urgent);
        assert_eq!(urgency.minutes_until, Some(31));
    }

    #[test]
    fn zero_or_negative_delta_is_not_urgent() {
        assert!(!classify(Some(now()), now()).is_urgent);

        let started = classify(Some(now() - Duration::minutes(10)), now());
        assert!(!started.is_urgent);
        assert_eq!(started.minutes_until, Some(-10));
    }

    #[test]
    fn no_occurrence_is_not_urgent() {
        let urgency = classify(None, now());
        assert!(!urgency.is_urgent);
        assert_eq!(urgency.minutes_until, None);
    }

    #[test]
    fn minutes_are_rounded() {
        let urgency = classify(Some(now() + Duration::seconds(90)), now());
        assert_eq!(urgency.minutes_until, Some(2));
    }
}
