//! Calendar provider seam.
//!
//! The core never talks to a calendar service. Callers hand it a
//! [`CalendarSource`] that returns already-fetched busy intervals for a window,
//! together with whether calendar access was granted at all.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar provider errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The provider could not be reached or read.
    #[error("calendar unavailable: {0}")]
    Unavailable(String),
    /// The provider returned data that could not be understood.
    #[error("malformed calendar data: {0}")]
    Malformed(String),
}

/// A calendar event that makes the user busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(alias = "endDate")]
    pub end: DateTime<Utc>,
    /// All-day events never block free time.
    #[serde(default)]
    pub all_day: bool,
}

impl BusyInterval {
    /// Creates a timed (not all-day) interval.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            start,
            end,
            all_day: false,
        }
    }

    /// Creates an all-day interval.
    pub fn all_day(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            all_day: true,
            ..Self::new(title, start, end)
        }
    }
}

/// What a provider returned for one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSnapshot {
    /// Whether the user granted calendar access.
    pub access_granted: bool,
    #[serde(default)]
    pub intervals: Vec<BusyInterval>,
}

impl CalendarSnapshot {
    /// A snapshot for a calendar the user let us read.
    pub const fn granted(intervals: Vec<BusyInterval>) -> Self {
        Self {
            access_granted: true,
            intervals,
        }
    }

    /// A snapshot for a calendar we may not read.
    pub const fn denied() -> Self {
        Self {
            access_granted: false,
            intervals: Vec::new(),
        }
    }

    /// The intervals to plan around. Without access this is empty, not an error.
    pub fn usable_intervals(&self) -> &[BusyInterval] {
        if self.access_granted {
            &self.intervals
        } else {
            &[]
        }
    }
}

/// Something that can list busy intervals for a time window.
pub trait CalendarSource {
    /// Returns busy intervals overlapping `[start, end]`.
    ///
    /// Implementations may return intervals outside the window; the free-block
    /// calculator filters them.
    fn busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError>;
}

/// A pre-fetched snapshot serves every window from the same intervals.
impl CalendarSource for CalendarSnapshot {
    fn busy_intervals(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        Ok(self.clone())
    }
}

/// The last millisecond of `now`'s calendar day in its own time zone.
pub fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let local = now.date_naive().and_time(last_ms);
    match tz.from_local_datetime(&local) {
        // Ambiguous (DST fall-back): the later instant is the true end of day
        LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.with_timezone(&Utc),
        // DST spring-forward gap right before midnight: step back an hour
        LocalResult::None => tz
            .from_local_datetime(&(local - Duration::hours(1)))
            .latest()
            .map_or_else(
                || now.with_timezone(&Utc) + Duration::hours(1),
                |dt| dt.with_timezone(&Utc),
            ),
    }
}
