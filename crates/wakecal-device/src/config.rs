//! Device loop configuration.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use wakecal_core::{DEFAULT_TITLE_WIDTH, DEFAULT_WAKEUP_LEAD_MINUTES};

use crate::alarm::{AlarmMode, DEFAULT_LATE_LIMIT_MINUTES};
use crate::error::{DeviceError, DeviceResult};
use crate::retry::RetryPolicy;

/// Runtime settings for the [`Controller`](crate::Controller).
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Calendar to poll.
    pub calendar_id: String,

    /// Number of event rows on screen, also the `maxResults` of each query.
    pub max_events: usize,

    /// Characters per title line.
    pub title_width: usize,

    /// Offset used for every displayed time.
    pub utc_offset: FixedOffset,

    /// Time between polls.
    pub poll_interval: Duration,

    /// Clock refresh cadence.
    pub tick_interval: Duration,

    /// Clip handed to the sound player.
    pub alarm_clip: String,

    pub alarm_mode: AlarmMode,

    /// How long before the first event the alarm rings.
    pub wakeup_lead: chrono::Duration,

    /// How long after the target a threshold alarm may still ring.
    pub late_limit: chrono::Duration,

    pub retry: RetryPolicy,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            max_events: 5,
            title_width: DEFAULT_TITLE_WIDTH,
            utc_offset: Utc.fix(),
            poll_interval: Duration::from_secs(30),
            tick_interval: Duration::from_secs(1),
            alarm_clip: "alarm.wav".to_string(),
            alarm_mode: AlarmMode::default(),
            wakeup_lead: chrono::Duration::minutes(DEFAULT_WAKEUP_LEAD_MINUTES),
            late_limit: chrono::Duration::minutes(DEFAULT_LATE_LIMIT_MINUTES),
            retry: RetryPolicy::default(),
        }
    }
}

impl DeviceConfig {
    /// Creates a configuration for the given calendar.
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            ..Default::default()
        }
    }

    /// Builder: set the number of event rows.
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Builder: set the title line width.
    pub fn with_title_width(mut self, width: usize) -> Self {
        self.title_width = width;
        self
    }

    /// Builder: set the display offset.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Builder: set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builder: set the alarm clip.
    pub fn with_alarm_clip(mut self, clip: impl Into<String>) -> Self {
        self.alarm_clip = clip.into();
        self
    }

    /// Builder: set the alarm comparison mode.
    pub fn with_alarm_mode(mut self, mode: AlarmMode) -> Self {
        self.alarm_mode = mode;
        self
    }

    /// Builder: set the wake-up lead time.
    pub fn with_wakeup_lead(mut self, lead: chrono::Duration) -> Self {
        self.wakeup_lead = lead;
        self
    }

    /// Builder: set the late limit for threshold alarms.
    pub fn with_late_limit(mut self, late_limit: chrono::Duration) -> Self {
        self.late_limit = late_limit;
        self
    }

    /// Builder: set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks values the loop cannot work with.
    pub fn validate(&self) -> DeviceResult<()> {
        if self.calendar_id.trim().is_empty() {
            return Err(DeviceError::config("calendar_id must not be empty"));
        }
        if self.max_events == 0 {
            return Err(DeviceError::config("max_events must be at least 1"));
        }
        if self.title_width == 0 {
            return Err(DeviceError::config("title_width must be at least 1"));
        }
        if self.poll_interval.is_zero() || self.tick_interval.is_zero() {
            return Err(DeviceError::config("intervals must be greater than zero"));
        }
        if self.wakeup_lead < chrono::Duration::zero() {
            return Err(DeviceError::config("lead time must not be negative"));
        }
        if self.late_limit <= chrono::Duration::zero() {
            return Err(DeviceError::config("late limit must be greater than zero"));
        }
        if !(self.retry.multiplier >= 1.0 && self.retry.multiplier.is_finite()) {
            return Err(DeviceError::config("retry multiplier must be at least 1.0"));
        }
        if self.retry.initial_backoff > self.retry.max_backoff {
            return Err(DeviceError::config(
                "initial backoff must not exceed max backoff",
            ));
        }
        Ok(())
    }
}

/// Converts a UTC offset in minutes (east positive) into a [`FixedOffset`].
pub fn offset_from_minutes(minutes: i32) -> DeviceResult<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            DeviceError::config(format!(
                "utc offset of {} minutes is out of range",
                minutes
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.max_events, 5);
        assert_eq!(config.title_width, 25);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.alarm_clip, "alarm.wav");
        assert_eq!(config.alarm_mode, AlarmMode::Threshold);
        assert_eq!(config.wakeup_lead, chrono::Duration::minutes(60));
        assert_eq!(config.retry.max_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_config() {
        let config = DeviceConfig::new("team@example.com")
            .with_max_events(3)
            .with_title_width(20)
            .with_utc_offset(offset_from_minutes(-300).unwrap())
            .with_poll_interval(Duration::from_secs(60))
            .with_alarm_clip("/sounds/bell.wav")
            .with_alarm_mode(AlarmMode::ExactSecond)
            .with_wakeup_lead(chrono::Duration::minutes(30))
            .with_late_limit(chrono::Duration::minutes(5))
            .with_retry(RetryPolicy::new(3));

        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(config.max_events, 3);
        assert_eq!(config.title_width, 20);
        assert_eq!(config.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.alarm_clip, "/sounds/bell.wav");
        assert_eq!(config.alarm_mode, AlarmMode::ExactSecond);
        assert_eq!(config.wakeup_lead, chrono::Duration::minutes(30));
        assert_eq!(config.late_limit, chrono::Duration::minutes(5));
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_errors() {
        assert!(DeviceConfig::default().with_max_events(0).validate().is_err());
        assert!(DeviceConfig::new(" ").validate().is_err());
        assert!(
            DeviceConfig::default()
                .with_poll_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            DeviceConfig::default()
                .with_late_limit(chrono::Duration::zero())
                .validate()
                .is_err()
        );
        let bad_retry = RetryPolicy::new(1).with_backoff(
            Duration::from_secs(10),
            Duration::from_secs(5),
            2.0,
        );
        assert!(DeviceConfig::default().with_retry(bad_retry).validate().is_err());
    }

    #[test]
    fn offsets() {
        assert_eq!(offset_from_minutes(330).unwrap().local_minus_utc(), 19800);
        assert_eq!(offset_from_minutes(0).unwrap().local_minus_utc(), 0);
        assert!(offset_from_minutes(24 * 60).is_err());
        assert!(offset_from_minutes(i32::MAX).is_err());
    }
}
