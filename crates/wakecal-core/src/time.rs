//! Event start times and the query window.
//!
//! Every poll asks the calendar for events starting between "now" and the
//! same instant a day later. Both bounds go on the wire as
//! `YYYY-MM-DDTHH:MM:SSZ`.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Length of the look-ahead window used for every calendar query, in hours.
pub const QUERY_WINDOW_HOURS: i64 = 24;

/// When an event starts: at an instant, or some time on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    /// `start.dateTime`, normalized to UTC.
    DateTime(DateTime<Utc>),
    /// `start.date` of an all-day event.
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// The instant, for timed starts only. All-day events never drive the alarm.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::DateTime(dt) => Some(dt),
            Self::AllDay(_) => None,
        }
    }
}

/// `[start, end)` bounds of one calendar query.
///
/// Built fresh for every fetch from a single clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// `timeMin`, the clock reading the window was built from.
    pub start: DateTime<Utc>,
    /// `timeMax`, exactly [`QUERY_WINDOW_HOURS`] after `start`.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// From `now` to the same instant one day later.
    ///
    /// Plain UTC arithmetic, so month, year and leap-day boundaries roll over
    /// with no special casing.
    pub fn next_day(now: DateTime<Utc>) -> Self {
        Self {
            start: now,
            end: now + Duration::hours(QUERY_WINDOW_HOURS),
        }
    }

    pub fn query_min(&self) -> String {
        format_query_time(self.start)
    }

    pub fn query_max(&self) -> String {
        format_query_time(self.end)
    }
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_query_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses an RFC 3339 timestamp (any offset) into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
