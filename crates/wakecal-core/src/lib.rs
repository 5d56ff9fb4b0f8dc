//! Core types: calendar events, query windows, wake-up planning, display strings.

pub mod event;
pub mod format;
pub mod planner;
pub mod time;
pub mod tracing;

pub use event::{CalendarEvent, EventBatch};
pub use format::{
    DEFAULT_TITLE_WIDTH, MAX_TITLE_LINES, format_clock, format_event_start, format_event_time,
    format_header, format_timestamp, to_display, wrap_lines, wrap_title,
};
pub use planner::{DEFAULT_WAKEUP_LEAD_MINUTES, WakeupPlanner, plan_wakeup};
pub use time::{EventTime, TimeWindow, format_query_time, parse_timestamp};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
