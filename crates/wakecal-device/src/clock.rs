//! Wall-clock source.
//!
//! All readings are truncated to whole seconds. A clock that cannot be read
//! is fatal for the device loop; there is no fallback.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use thiserror::Error;
use tokio::time::Instant;
use wakecal_core::time::QUERY_WINDOW_HOURS;

/// Errors reading or setting the clock.
#[derive(Debug, Error)]
pub enum ClockError {
    /// The underlying clock could not be read.
    #[error("real-time clock unavailable: {0}")]
    Unavailable(String),

    /// The reading does not fit in the supported date range.
    #[error("clock reading out of range")]
    OutOfRange,
}

pub type ClockResult<T> = Result<T, ClockError>;

/// Source of the current UTC time.
pub trait Clock: Send {
    /// Current time, truncated to whole seconds.
    fn now(&self) -> ClockResult<DateTime<Utc>>;

    /// Re-anchors the clock so that `now()` reads `now` from here on.
    fn set(&mut self, now: DateTime<Utc>) -> ClockResult<()>;

    /// `now()` advanced by exactly one day; upper bound of the query window.
    fn now_plus_one_day(&self) -> ClockResult<DateTime<Utc>> {
        self.now()?
            .checked_add_signed(Duration::hours(QUERY_WINDOW_HOURS))
            .ok_or(ClockError::OutOfRange)
    }
}

/// The host clock, shifted by an adjustable offset.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    offset: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset against the host clock.
    pub fn offset(&self) -> Duration {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockResult<DateTime<Utc>> {
        Utc::now()
            .checked_add_signed(self.offset)
            .map(|dt| dt.trunc_subsecs(0))
            .ok_or(ClockError::OutOfRange)
    }

    fn set(&mut self, now: DateTime<Utc>) -> ClockResult<()> {
        self.offset = now - Utc::now();
        Ok(())
    }
}

/// A clock anchored at a known instant and advanced by the monotonic timer.
///
/// Unaffected by host clock jumps. Under a paused tokio runtime it advances
/// with the runtime's virtual time.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    anchor: DateTime<Utc>,
    start: Instant,
}

impl MonotonicClock {
    /// Starts a clock that reads `anchor` right now.
    pub fn starting_at(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> ClockResult<DateTime<Utc>> {
        let elapsed =
            Duration::from_std(self.start.elapsed()).map_err(|_| ClockError::OutOfRange)?;
        self.anchor
            .checked_add_signed(elapsed)
            .map(|dt| dt.trunc_subsecs(0))
            .ok_or(ClockError::OutOfRange)
    }

    fn set(&mut self, now: DateTime<Utc>) -> ClockResult<()> {
        self.anchor = now;
        self.start = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn system_clock_has_whole_seconds() {
        let clock = SystemClock::new();
        assert_eq!(clock.now().unwrap().nanosecond(), 0);
    }

    #[test]
    fn system_clock_set_applies_offset() {
        let mut clock = SystemClock::new();
        let target = utc(2030, 6, 15, 12, 0, 0);
        clock.set(target).unwrap();

        let drift = (clock.now().unwrap() - target).num_seconds();
        assert!((0..=2).contains(&drift), "drift was {drift}s");
        assert!(clock.offset() > Duration::zero());
    }

    #[tokio::test(start_paused = true)]
    async fn monotonic_clock_follows_runtime_time() {
        let clock = MonotonicClock::starting_at(utc(2024, 3, 1, 7, 59, 58));
        assert_eq!(clock.now().unwrap(), utc(2024, 3, 1, 7, 59, 58));

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        assert_eq!(clock.now().unwrap(), utc(2024, 3, 1, 8, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn monotonic_clock_set_reanchors() {
        let mut clock = MonotonicClock::starting_at(utc(2024, 3, 1, 0, 0, 0));
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        clock.set(utc(2025, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!(clock.now().unwrap(), utc(2025, 1, 1, 0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn one_day_ahead_rolls_over_month_and_year() {
        let clock = MonotonicClock::starting_at(utc(2024, 1, 31, 23, 0, 0));
        assert_eq!(clock.now_plus_one_day().unwrap(), utc(2024, 2, 1, 23, 0, 0));

        let clock = MonotonicClock::starting_at(utc(2023, 12, 31, 23, 59, 59));
        assert_eq!(clock.now_plus_one_day().unwrap(), utc(2024, 1, 1, 23, 59, 59));
    }
}
