//! Next-occurrence calculation for weekly-recurring schedules.
//!
//! Replaces the per-handler "calculate next class time" helper that was
//! duplicated across the course, quiz, and assignment update paths; every
//! caller now depends on this single implementation.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

use bellman_core::{ScheduleSnapshot, Weekday};

/// An occurrence that started up to this many minutes before `from`
/// still counts as the next one. Absorbs staff editing a course
/// moments into the lecture.
pub const GRACE_MINUTES: i64 = 30;

/// How many candidate dates to examine. Eight dates cover the full
/// coming week including the wrap-around back to `from`'s own weekday.
const HORIZON_DATES: i64 = 8;

/// Parse a clock string in either `H:MM AM/PM` or 24-hour `HH:MM` form.
///
/// Returns `None` on anything unparseable; callers treat that as
/// "no time for that day" rather than an error.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(stripped) = upper.strip_suffix("AM") {
        (stripped.trim_end(), Some(false))
    } else if let Some(stripped) = upper.strip_suffix("PM") {
        (stripped.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hour_str, minute_str) = clock.split_once(':')?;
    let hour: u32 = hour_str.trim().parse().ok()?;
    let minute: u32 = minute_str.trim().parse().ok()?;

    let hour = match meridiem {
        // 12 AM is midnight, 12 PM is noon.
        Some(false) if hour == 12 => 0,
        Some(true) if (1..=11).contains(&hour) => hour + 12,
        Some(_) if hour == 12 => 12,
        Some(_) if hour >= 13 => return None,
        _ => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Compute the next datetime this weekly schedule fires, starting from
/// `from` and honoring the [`GRACE_MINUTES`] window.
///
/// Returns `None` when no day has a resolvable, parseable time or no
/// occurrence falls within the coming week. Pure function of its
/// arguments; unchanged inputs always yield the same answer.
pub fn next_occurrence(schedule: &ScheduleSnapshot, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if schedule.days.is_empty() {
        return None;
    }

    let grace = Duration::minutes(GRACE_MINUTES);

    for offset in 0..HORIZON_DATES {
        let date = from.date_naive() + Duration::days(offset);
        let weekday = Weekday::from_chrono(date.weekday());
        if !schedule.days.contains(&weekday) {
            continue;
        }

        let Some(range) = schedule.time_for(weekday) else {
            continue;
        };
        let Some(start) = parse_clock_time(&range.start) else {
            tracing::debug!(day = %weekday, raw = %range.start, "unparseable start time, skipping day");
            continue;
        };

        let candidate = Utc.from_utc_datetime(&date.and_time(start));
        if candidate.signed_duration_since(from) >= -grace {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday as ChronoWeekday;
    use std::collections::{BTreeMap, BTreeSet};

    use bellman_core::TimeRange;

    /// Monday 2024-03-04 at the given clock time.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        let dt = Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap();
        assert_eq!(dt.weekday(), ChronoWeekday::Mon);
        dt
    }

    fn monday_nine_am() -> ScheduleSnapshot {
        ScheduleSnapshot {
            days: BTreeSet::from([Weekday::Monday]),
            per_day_times: BTreeMap::new(),
            start: Some("9:00 AM".to_string()),
            end: Some("11:00 AM".to_string()),
        }
    }

    // -- parse_clock_time --------------------------------------------------

    #[test]
    fn parse_twelve_hour_times() {
        assert_eq!(
            parse_clock_time("9:00 AM"),
            NaiveTime::from_hms_opt(9, 0, 0)
        );
        assert_eq!(
            parse_clock_time("2:30 pm"),
            NaiveTime::from_hms_opt(14, 30, 0)
        );
        assert_eq!(
            parse_clock_time("12:00 AM"),
            NaiveTime::from_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_clock_time("12:15PM"),
            NaiveTime::from_hms_opt(12, 15, 0)
        );
    }

    #[test]
    fn parse_twenty_four_hour_times() {
        assert_eq!(parse_clock_time("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(
            parse_clock_time("21:45"),
            NaiveTime::from_hms_opt(21, 45, 0)
        );
    }

    #[test]
    fn parse_garbage_returns_none() {
        assert_eq!(parse_clock_time(""), None);
        assert_eq!(parse_clock_time("noonish"), None);
        assert_eq!(parse_clock_time("25:00"), None);
        assert_eq!(parse_clock_time("13:00 PM"), None);
    }

    // -- next_occurrence ---------------------------------------------------

    #[test]
    fn before_start_returns_same_day() {
        let next = next_occurrence(&monday_nine_am(), monday_at(8, 50)).unwrap();
        assert_eq!(next, monday_at(9, 0));
    }

    #[test]
    fn within_grace_window_still_counts() {
        // 10 minutes after start, inside the 30-minute grace.
        let next = next_occurrence(&monday_nine_am(), monday_at(9, 10)).unwrap();
        assert_eq!(next, monday_at(9, 0));
    }

    #[test]
    fn past_grace_rolls_to_next_week() {
        let next = next_occurrence(&monday_nine_am(), monday_at(9, 35)).unwrap();
        assert_eq!(next, monday_at(9, 0) + Duration::days(7));
    }

    #[test]
    fn empty_days_returns_none() {
        let schedule = ScheduleSnapshot::default();
        assert_eq!(next_occurrence(&schedule, monday_at(8, 0)), None);
    }

    #[test]
    fn unparseable_day_is_skipped_not_fatal() {
        let schedule = ScheduleSnapshot {
            days: BTreeSet::from([Weekday::Monday, Weekday::Wednesday]),
            per_day_times: BTreeMap::from([(
                Weekday::Monday,
                TimeRange::new("not a time", "later"),
            )]),
            start: Some("10:00".to_string()),
            end: Some("12:00".to_string()),
        };

        // Monday's time is garbage; Wednesday's fallback still resolves.
        let next = next_occurrence(&schedule, monday_at(8, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap());
    }

    #[test]
    fn day_without_any_time_returns_none() {
        let schedule = ScheduleSnapshot {
            days: BTreeSet::from([Weekday::Monday]),
            ..Default::default()
        };
        assert_eq!(next_occurrence(&schedule, monday_at(8, 0)), None);
    }

    #[test]
    fn per_day_time_overrides_fallback() {
        let mut schedule = monday_nine_am();
        schedule
            .per_day_times
            .insert(Weekday::Monday, TimeRange::new("3:00 PM", "5:00 PM"));

        let next = next_occurrence(&schedule, monday_at(8, 0)).unwrap();
        assert_eq!(next, monday_at(15, 0));
    }

    #[test]
    fn idempotent_for_same_inputs() {
        let schedule = monday_nine_am();
        let from = monday_at(8, 45);
        assert_eq!(
            next_occurrence(&schedule, from),
            next_occurrence(&schedule, from)
        );
    }
}
