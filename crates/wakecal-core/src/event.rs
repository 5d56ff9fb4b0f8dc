//! Calendar event types shared by the fetcher, planner and presenter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// A single upcoming event as shown on the display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title; empty when the calendar entry has none.
    pub summary: String,
    /// Event start, absent when the API omitted it or it did not parse.
    pub start: Option<EventTime>,
}

impl CalendarEvent {
    /// Creates a new event.
    pub fn new(summary: impl Into<String>, start: Option<EventTime>) -> Self {
        Self {
            summary: summary.into(),
            start,
        }
    }

    /// Creates a timed event starting at `start`.
    pub fn at(summary: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self::new(summary, Some(EventTime::from_utc(start)))
    }

    /// The start instant for timed events; `None` for all-day or missing starts.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().and_then(EventTime::as_datetime)
    }
}

/// The result of one calendar query.
///
/// `events` keep the order the API returned them in (ascending start time).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventBatch {
    /// Start instant of the first event, if it has a timed start.
    pub first_start_time: Option<DateTime<Utc>>,
    /// Events in API order.
    pub events: Vec<CalendarEvent>,
}

impl EventBatch {
    /// Builds a batch, deriving `first_start_time` from the first event.
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        let first_start_time = events.first().and_then(CalendarEvent::start_time);
        Self {
            first_start_time,
            events,
        }
    }

    /// Returns true if the query matched no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
