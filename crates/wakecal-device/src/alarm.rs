//! Alarm firing decision.
//!
//! The wake-up target is re-planned on every poll, but each target must ring
//! at most once. [`AlarmLatch`] remembers the last target that fired.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default window after the target during which a threshold alarm may still fire.
pub const DEFAULT_LATE_LIMIT_MINUTES: i64 = 60;

/// How the current time is compared with the wake-up target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmMode {
    /// Fire once when `target <= now < target + late_limit`.
    #[default]
    Threshold,
    /// Fire only when `now` equals the target to the second.
    #[serde(rename = "exact")]
    ExactSecond,
}

impl AlarmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::ExactSecond => "exact",
        }
    }
}

impl fmt::Display for AlarmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threshold" => Ok(Self::Threshold),
            "exact" => Ok(Self::ExactSecond),
            other => Err(format!(
                "unknown alarm mode '{}', expected 'threshold' or 'exact'",
                other
            )),
        }
    }
}

/// Fire-once latch over the current wake-up target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmLatch {
    mode: AlarmMode,
    late_limit: Duration,
    target: Option<DateTime<Utc>>,
    fired_for: Option<DateTime<Utc>>,
}

impl Default for AlarmLatch {
    fn default() -> Self {
        Self::new(
            AlarmMode::default(),
            Duration::minutes(DEFAULT_LATE_LIMIT_MINUTES),
        )
    }
}

impl AlarmLatch {
    pub fn new(mode: AlarmMode, late_limit: Duration) -> Self {
        Self {
            mode,
            late_limit,
            target: None,
            fired_for: None,
        }
    }

    /// Sets the target from the latest plan.
    ///
    /// A target that already fired stays fired even if it disappears from a
    /// later plan and comes back.
    pub fn arm(&mut self, target: Option<DateTime<Utc>>) {
        if target != self.target {
            debug!(?target, previous = ?self.target, "wake-up target changed");
            self.target = target;
        }
    }

    /// Returns true exactly once per target, when `now` is due for it.
    pub fn should_fire(&mut self, now: DateTime<Utc>) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if self.fired_for == Some(target) {
            return false;
        }

        let due = match self.mode {
            AlarmMode::Threshold => target <= now && now < target + self.late_limit,
            AlarmMode::ExactSecond => now == target,
        };
        if due {
            self.fired_for = Some(target);
        }
        due
    }

    pub fn mode(&self) -> AlarmMode {
        self.mode
    }

    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.target
    }

    /// True when the current target has already fired.
    pub fn has_fired(&self) -> bool {
        self.target.is_some() && self.fired_for == self.target
    }
}
