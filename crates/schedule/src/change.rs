//! Structured change detection between course snapshots.
//!
//! Each changed field yields a tagged [`ChangeEntry`] instead of a
//! free-form string, so notification titles are a priority lookup over
//! [`ChangedField`] rather than substring matching on descriptions.

use std::collections::BTreeSet;

use serde::Serialize;

use bellman_core::{CourseSnapshot, CourseUpdate, Weekday};

/// Which course field a change entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Name,
    Venue,
    Days,
    Time,
    CreditHours,
}

impl std::fmt::Display for ChangedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangedField::Name => write!(f, "name"),
            ChangedField::Venue => write!(f, "venue"),
            ChangedField::Days => write!(f, "days"),
            ChangedField::Time => write!(f, "time"),
            ChangedField::CreditHours => write!(f, "credit_hours"),
        }
    }
}

/// Priority order for picking the notification title when several
/// fields changed at once. Cancellation outranks all of these and is
/// carried separately on [`ChangeSet`].
const TITLE_PRIORITY: [ChangedField; 5] = [
    ChangedField::Time,
    ChangedField::Venue,
    ChangedField::Days,
    ChangedField::Name,
    ChangedField::CreditHours,
];

/// One detected field change with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub field: ChangedField,
    pub text: String,
}

/// Ordered set of changes detected in one update. Ephemeral: produced
/// fresh per update and discarded after dispatch, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub entries: Vec<ChangeEntry>,
    /// True when the venue was cleared while previously set, or all
    /// meeting days were removed.
    pub is_cancellation: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.is_cancellation
    }

    /// The highest-priority changed field, used for title selection.
    pub fn primary_field(&self) -> Option<ChangedField> {
        TITLE_PRIORITY
            .into_iter()
            .find(|field| self.entries.iter().any(|e| e.field == *field))
    }

    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }
}

/// Diff a course snapshot against a partial update.
///
/// Rules are evaluated independently and in a fixed order
/// (name, venue, days, time, credit hours) so entry ordering is
/// deterministic. Fields absent from the update are untouched and
/// never emit.
pub fn detect_changes(before: &CourseSnapshot, update: &CourseUpdate) -> ChangeSet {
    let mut entries = Vec::new();
    let mut venue_cleared = false;
    let mut days_emptied = false;

    if let Some(name) = &update.name {
        if *name != before.name {
            entries.push(ChangeEntry {
                field: ChangedField::Name,
                text: format!("Course name changed from \"{}\" to \"{}\"", before.name, name),
            });
        }
    }

    if let Some(venue) = &update.venue {
        let old = normalize_venue(before.venue.as_deref());
        let new = normalize_venue(Some(venue));
        if old != new {
            if new.is_empty() {
                venue_cleared = true;
                entries.push(ChangeEntry {
                    field: ChangedField::Venue,
                    text: format!("Venue \"{old}\" removed"),
                });
            } else if old.is_empty() {
                entries.push(ChangeEntry {
                    field: ChangedField::Venue,
                    text: format!("Venue set to \"{new}\""),
                });
            } else {
                entries.push(ChangeEntry {
                    field: ChangedField::Venue,
                    text: format!("Venue changed from \"{old}\" to \"{new}\""),
                });
            }
        }
    }

    if let Some(days) = &update.days {
        if *days != before.schedule.days {
            if days.is_empty() {
                if !before.schedule.days.is_empty() {
                    days_emptied = true;
                }
                entries.push(ChangeEntry {
                    field: ChangedField::Days,
                    text: format!("All class days removed (was {})", format_days(&before.schedule.days)),
                });
            } else {
                entries.push(ChangeEntry {
                    field: ChangedField::Days,
                    text: format!(
                        "Class days changed from {} to {}",
                        format_days(&before.schedule.days),
                        format_days(days)
                    ),
                });
            }
        }
    }

    if let Some(text) = detect_time_change(before, update) {
        entries.push(ChangeEntry {
            field: ChangedField::Time,
            text,
        });
    }

    if let Some(credit) = &update.credit_hours {
        let old = display_credit(before.credit_hours.as_deref());
        let new = display_credit(Some(credit));
        if old != new {
            entries.push(ChangeEntry {
                field: ChangedField::CreditHours,
                text: format!("Credit hours changed from {old} to {new}"),
            });
        }
    }

    let change_set = ChangeSet {
        entries,
        is_cancellation: venue_cleared || days_emptied,
    };

    tracing::debug!(
        course = %before.name,
        changes = change_set.entries.len(),
        cancellation = change_set.is_cancellation,
        "change detection complete"
    );

    change_set
}

/// Emit a time change when the update touches any time field and the
/// effective per-day map differs in aggregate, or the fallback
/// start/end pair changed on its own.
fn detect_time_change(before: &CourseSnapshot, update: &CourseUpdate) -> Option<String> {
    let touched =
        update.per_day_times.is_some() || update.start.is_some() || update.end.is_some();
    if !touched {
        return None;
    }

    let after = before.apply(update);

    let fallback_changed = after.schedule.start != before.schedule.start
        || after.schedule.end != before.schedule.end;
    let effective_changed =
        after.schedule.effective_times() != before.schedule.effective_times();

    if !fallback_changed && !effective_changed {
        return None;
    }

    if update.per_day_times.is_none() {
        Some(format!(
            "Time changed from {} to {}",
            format_fallback(&before.schedule.start, &before.schedule.end),
            format_fallback(&after.schedule.start, &after.schedule.end),
        ))
    } else {
        let changed_days: Vec<String> = after
            .schedule
            .effective_times()
            .iter()
            .filter(|(day, range)| before.schedule.time_for(**day).as_ref() != Some(*range))
            .map(|(day, range)| format!("{day} {} - {}", range.start, range.end))
            .collect();
        if changed_days.is_empty() {
            Some("Class times changed".to_string())
        } else {
            Some(format!("Class times changed: {}", changed_days.join(", ")))
        }
    }
}

fn normalize_venue(venue: Option<&str>) -> String {
    venue.map(str::trim).unwrap_or("").to_string()
}

fn display_credit(credit: Option<&str>) -> String {
    match credit.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => "Not set".to_string(),
    }
}

fn format_days(days: &BTreeSet<Weekday>) -> String {
    if days.is_empty() {
        return "none".to_string();
    }
    days.iter()
        .map(Weekday::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_fallback(start: &Option<String>, end: &Option<String>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{start} - {end}"),
        (Some(start), None) => start.clone(),
        _ => "Not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use uuid::Uuid;

    use bellman_core::{ScheduleSnapshot, TimeRange};

    fn course() -> CourseSnapshot {
        CourseSnapshot {
            id: Uuid::new_v4(),
            name: "Thermodynamics".to_string(),
            venue: Some("Room A".to_string()),
            credit_hours: Some("3".to_string()),
            schedule: ScheduleSnapshot {
                days: BTreeSet::from([Weekday::Monday, Weekday::Wednesday]),
                per_day_times: BTreeMap::new(),
                start: Some("9:00 AM".to_string()),
                end: Some("11:00 AM".to_string()),
            },
        }
    }

    /// An update payload restating the snapshot exactly.
    fn identity_update(snapshot: &CourseSnapshot) -> CourseUpdate {
        CourseUpdate {
            name: Some(snapshot.name.clone()),
            venue: snapshot.venue.clone(),
            credit_hours: snapshot.credit_hours.clone(),
            days: Some(snapshot.schedule.days.clone()),
            per_day_times: Some(snapshot.schedule.per_day_times.clone()),
            start: snapshot.schedule.start.clone(),
            end: snapshot.schedule.end.clone(),
        }
    }

    #[test]
    fn identical_update_yields_empty_change_set() {
        let before = course();
        let changes = detect_changes(&before, &identity_update(&before));
        assert!(changes.is_empty());
        assert!(!changes.is_cancellation);
    }

    #[test]
    fn clearing_venue_is_a_cancellation() {
        let before = course();
        let update = CourseUpdate {
            venue: Some("".to_string()),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        assert!(changes.is_cancellation);
        assert_eq!(changes.entries.len(), 1);
        assert_eq!(changes.entries[0].field, ChangedField::Venue);
    }

    #[test]
    fn venue_whitespace_is_not_a_change() {
        let before = course();
        let update = CourseUpdate {
            venue: Some("  Room A  ".to_string()),
            ..Default::default()
        };
        assert!(detect_changes(&before, &update).is_empty());
    }

    #[test]
    fn removing_all_days_is_a_cancellation() {
        let before = course();
        let update = CourseUpdate {
            days: Some(BTreeSet::new()),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        assert!(changes.is_cancellation);
        assert_eq!(changes.entries[0].field, ChangedField::Days);
    }

    #[test]
    fn entries_keep_field_order() {
        let before = course();
        let update = CourseUpdate {
            name: Some("Thermodynamics II".to_string()),
            venue: Some("Room B".to_string()),
            credit_hours: Some("4".to_string()),
            start: Some("10:00 AM".to_string()),
            end: Some("12:00 PM".to_string()),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        let fields: Vec<ChangedField> = changes.entries.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                ChangedField::Name,
                ChangedField::Venue,
                ChangedField::Time,
                ChangedField::CreditHours,
            ]
        );
        assert!(!changes.is_cancellation);
    }

    #[test]
    fn primary_field_follows_priority() {
        let before = course();
        let update = CourseUpdate {
            name: Some("Renamed".to_string()),
            start: Some("10:00 AM".to_string()),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        assert_eq!(changes.primary_field(), Some(ChangedField::Time));
    }

    #[test]
    fn absent_credit_hours_display_as_not_set() {
        let mut before = course();
        before.credit_hours = None;
        let update = CourseUpdate {
            credit_hours: Some("2".to_string()),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        assert_eq!(changes.entries[0].text, "Credit hours changed from Not set to 2");
    }

    #[test]
    fn per_day_time_change_names_the_day() {
        let before = course();
        let update = CourseUpdate {
            per_day_times: Some(BTreeMap::from([(
                Weekday::Monday,
                TimeRange::new("2:00 PM", "4:00 PM"),
            )])),
            ..Default::default()
        };

        let changes = detect_changes(&before, &update);
        assert_eq!(changes.entries.len(), 1);
        assert_eq!(changes.entries[0].field, ChangedField::Time);
        assert!(changes.entries[0].text.contains("Monday 2:00 PM - 4:00 PM"));
    }
}
