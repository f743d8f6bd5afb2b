use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BellmanError;
use crate::weekday::Weekday;

/// Raw start/end clock strings for one class session.
///
/// Times are kept as the strings the course representative entered
/// (e.g. `"9:00 AM"` or `"14:30"`); parsing happens at occurrence
/// calculation so an unparseable time degrades to a skipped day
/// instead of poisoning the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Immutable weekly-recurrence snapshot of a course schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    /// Days the class meets.
    pub days: BTreeSet<Weekday>,
    /// Per-day start/end overrides. Days absent here fall back to
    /// `start`/`end`.
    #[serde(default)]
    pub per_day_times: BTreeMap<Weekday, TimeRange>,
    /// Fallback start time applied to every day without an override.
    #[serde(default)]
    pub start: Option<String>,
    /// Fallback end time applied to every day without an override.
    #[serde(default)]
    pub end: Option<String>,
}

impl ScheduleSnapshot {
    /// Resolve the effective start/end pair for a day, per-day first,
    /// fallback second. `None` when neither is present.
    pub fn time_for(&self, day: Weekday) -> Option<TimeRange> {
        if let Some(range) = self.per_day_times.get(&day) {
            return Some(range.clone());
        }
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(TimeRange::new(start.clone(), end.clone())),
            _ => None,
        }
    }

    /// The effective day → time map this schedule describes.
    ///
    /// Days without a resolvable time are omitted; [`validate`](Self::validate)
    /// is the place where that omission becomes an error.
    pub fn effective_times(&self) -> BTreeMap<Weekday, TimeRange> {
        self.days
            .iter()
            .filter_map(|&day| self.time_for(day).map(|range| (day, range)))
            .collect()
    }

    /// Every day in `days` must resolve to a start/end pair. A day with
    /// no resolvable time is a data error, not a silent skip.
    pub fn validate(&self) -> Result<(), BellmanError> {
        for &day in &self.days {
            if self.time_for(day).is_none() {
                return Err(BellmanError::UnresolvableDay(day));
            }
        }
        Ok(())
    }
}

/// Full course record as persisted before an update arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub credit_hours: Option<String>,
    pub schedule: ScheduleSnapshot,
}

/// Partial update payload for a course record. Absent fields are
/// untouched; `Some("")` on `venue` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub credit_hours: Option<String>,
    #[serde(default)]
    pub days: Option<BTreeSet<Weekday>>,
    #[serde(default)]
    pub per_day_times: Option<BTreeMap<Weekday, TimeRange>>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl CourseSnapshot {
    /// Apply a partial update, producing the post-update snapshot.
    pub fn apply(&self, update: &CourseUpdate) -> CourseSnapshot {
        CourseSnapshot {
            id: self.id,
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            venue: match &update.venue {
                Some(venue) if venue.trim().is_empty() => None,
                Some(venue) => Some(venue.clone()),
                None => self.venue.clone(),
            },
            credit_hours: update
                .credit_hours
                .clone()
                .or_else(|| self.credit_hours.clone()),
            schedule: ScheduleSnapshot {
                days: update
                    .days
                    .clone()
                    .unwrap_or_else(|| self.schedule.days.clone()),
                per_day_times: update
                    .per_day_times
                    .clone()
                    .unwrap_or_else(|| self.schedule.per_day_times.clone()),
                start: update.start.clone().or_else(|| self.schedule.start.clone()),
                end: update.end.clone().or_else(|| self.schedule.end.clone()),
            },
        }
    }
}
