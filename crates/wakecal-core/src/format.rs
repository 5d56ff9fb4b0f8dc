//! Display strings for the calendar screen.
//!
//! Everything here is pure: callers convert instants into the display
//! offset first and hand the result to these functions.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};

use crate::time::EventTime;

/// Maximum number of lines an event title may occupy.
pub const MAX_TITLE_LINES: usize = 2;

/// Default character width of an event title line.
pub const DEFAULT_TITLE_WIDTH: usize = 25;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Formats the header date, e.g. `Friday Mar. 01, 2024`.
pub fn format_header<D: Datelike>(date: &D) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS[date.month0() as usize];
    format!("{} {}. {:02}, {:04}", weekday, month, date.day(), date.year())
}

/// Formats the live clock as 24-hour `HH:MM`.
pub fn format_clock<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Formats an event start as 12-hour `H:MMam`/`H:MMpm`.
pub fn format_event_time<T: Timelike>(time: &T) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02}{}",
        hour,
        time.minute(),
        if is_pm { "pm" } else { "am" }
    )
}

/// Formats an optional event start in the given display offset.
///
/// All-day events read `All day`; a missing start is blank.
pub fn format_event_start(start: Option<&EventTime>, offset: &FixedOffset) -> String {
    match start {
        Some(EventTime::DateTime(dt)) => format_event_time(&dt.with_timezone(offset)),
        Some(EventTime::AllDay(_)) => "All day".to_string(),
        None => String::new(),
    }
}

/// Formats a timestamp either as the header date (`pretty`) or as an event time.
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>, pretty: bool) -> String {
    if pretty {
        format_header(dt)
    } else {
        format_event_time(dt)
    }
}

/// Converts a UTC instant into the display offset.
pub fn to_display(dt: DateTime<Utc>, offset: &FixedOffset) -> DateTime<FixedOffset> {
    dt.with_timezone(offset)
}

/// Word-wraps `text` into lines of at most `max_chars` characters.
///
/// Words are split on whitespace. A word longer than `max_chars` is kept
/// whole on its own line.
pub fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps an event title onto at most [`MAX_TITLE_LINES`] lines.
///
/// Lines past the limit are dropped without an ellipsis.
pub fn wrap_title(summary: &str, max_chars: usize) -> String {
    wrap_lines(summary, max_chars)
        .into_iter()
        .take(MAX_TITLE_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}
