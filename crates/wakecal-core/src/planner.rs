//! Wake-up planning.
//!
//! The alarm target is derived from the earliest fetched event: a fixed lead
//! time before it starts.

use chrono::{DateTime, Duration, Utc};

/// Lead time between the alarm and the first event, in minutes.
pub const DEFAULT_WAKEUP_LEAD_MINUTES: i64 = 60;

/// Computes alarm targets from event start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupPlanner {
    lead: Duration,
}

impl Default for WakeupPlanner {
    fn default() -> Self {
        Self {
            lead: Duration::minutes(DEFAULT_WAKEUP_LEAD_MINUTES),
        }
    }
}

impl WakeupPlanner {
    /// Creates a planner with a custom lead time.
    pub fn with_lead(lead: Duration) -> Self {
        Self { lead }
    }

    /// Returns the configured lead time.
    pub fn lead(&self) -> Duration {
        self.lead
    }

    /// Returns the alarm target for the first event, or `None` when there is none.
    pub fn plan(&self, first_start_time: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        first_start_time.map(|start| start - self.lead)
    }
}

/// Plans with the default lead.
pub fn plan_wakeup(first_start_time: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    WakeupPlanner::default().plan(first_start_time)
}
