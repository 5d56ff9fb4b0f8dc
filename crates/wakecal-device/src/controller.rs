//! Main loop.
//!
//! One task multiplexes two timers:
//!
//! - the **tick** timer (every second) re-renders the clock when the clock's
//!   second changed and checks the alarm against the current plan;
//! - the **poll** timer (every `poll_interval`) refreshes the access token if
//!   due, fetches the next day of events, re-renders the screen, re-plans the
//!   wake-up target and checks the alarm.
//!
//! Between polls only ticks run. [`Controller::run`] returns only on a fatal
//! error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use wakecal_core::{CalendarEvent, TimeWindow, WakeupPlanner};
use wakecal_providers::google::{Authenticator, CalendarFetcher};

use crate::alarm::AlarmLatch;
use crate::clock::Clock;
use crate::config::DeviceConfig;
use crate::error::{DeviceError, DeviceResult};
use crate::presenter::Presenter;
use crate::render::Renderer;
use crate::retry::RetryState;
use crate::sound::SoundPlayer;

/// Host hardware the controller drives.
pub struct Capabilities {
    pub clock: Box<dyn Clock>,
    pub renderer: Box<dyn Renderer>,
    pub player: Box<dyn SoundPlayer>,
}

/// Orchestrates polling, rendering and the alarm.
pub struct Controller {
    config: DeviceConfig,
    clock: Box<dyn Clock>,
    presenter: Presenter,
    player: Box<dyn SoundPlayer>,
    auth: Authenticator,
    fetcher: CalendarFetcher,
    planner: WakeupPlanner,
    latch: AlarmLatch,
    retry: RetryState,
    events: Vec<CalendarEvent>,
    last_second: Option<i64>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("latch", &self.latch)
            .field("retry", &self.retry)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn new(
        config: DeviceConfig,
        capabilities: Capabilities,
        auth: Authenticator,
        fetcher: CalendarFetcher,
    ) -> Self {
        let presenter = Presenter::new(
            capabilities.renderer,
            config.utc_offset,
            config.max_events,
            config.title_width,
        );
        Self {
            planner: WakeupPlanner::with_lead(config.wakeup_lead),
            latch: AlarmLatch::new(config.alarm_mode, config.late_limit),
            clock: capabilities.clock,
            player: capabilities.player,
            presenter,
            auth,
            fetcher,
            retry: RetryState::new(),
            events: Vec::new(),
            last_second: None,
            config,
        }
    }

    /// Events from the last successful poll.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Current alarm target, if any.
    pub fn wakeup_target(&self) -> Option<DateTime<Utc>> {
        self.latch.target()
    }

    pub fn retry_state(&self) -> &RetryState {
        &self.retry
    }

    /// Re-renders the clock and checks the alarm if the second changed.
    pub fn tick(&mut self) -> DeviceResult<()> {
        let now = self.clock.now()?;
        let second = now.timestamp();
        if self.last_second == Some(second) {
            return Ok(());
        }
        self.last_second = Some(second);

        self.presenter.render_clock(now);
        self.check_alarm(now);
        Ok(())
    }

    /// One full poll: token check, fetch, render, plan, alarm check.
    ///
    /// `monotonic_now` drives token expiry; the window comes from the clock.
    pub async fn poll(&mut self, monotonic_now: Instant) -> DeviceResult<()> {
        self.auth
            .ensure_fresh(monotonic_now)
            .await
            .map_err(DeviceError::auth)?;

        let now = self.clock.now()?;
        self.presenter.render_header(now);

        let window = TimeWindow::next_day(now);
        let batch = self
            .fetcher
            .fetch(
                &self.config.calendar_id,
                self.config.max_events,
                &window,
                self.auth.access_token(),
            )
            .await
            .map_err(DeviceError::api)?;

        self.presenter.render_events(&batch.events);

        let target = self.planner.plan(batch.first_start_time);
        match target {
            Some(target) => debug!(%target, "wake-up time planned"),
            None => debug!("no timed event ahead, alarm disarmed"),
        }
        self.latch.arm(target);
        self.events = batch.events;

        let now = self.clock.now()?;
        self.check_alarm(now);
        Ok(())
    }

    /// Runs [`poll`](Self::poll) under the retry policy.
    ///
    /// Returns the backoff before the next poll when a transient failure is
    /// still within budget, `None` after a successful poll.
    pub async fn poll_cycle(&mut self, monotonic_now: Instant) -> DeviceResult<Option<Duration>> {
        match self.poll(monotonic_now).await {
            Ok(()) => {
                self.retry.record_success();
                Ok(None)
            }
            Err(e) if e.is_retryable() => {
                let failures = self.retry.record_failure(e.to_string());
                if !self.config.retry.allows(failures) {
                    error!(
                        failures,
                        max = self.config.retry.max_retries,
                        "retry budget exhausted"
                    );
                    return Err(e);
                }
                let delay = self.config.retry.backoff_delay(failures);
                warn!(error = %e, failures, delay_secs = delay.as_secs(), "poll failed, backing off");
                Ok(Some(delay))
            }
            Err(e) => Err(e),
        }
    }

    /// Plays the alarm if the latch says so. Returns whether it fired.
    pub fn check_alarm(&mut self, now: DateTime<Utc>) -> bool {
        if !self.latch.should_fire(now) {
            return false;
        }

        info!(%now, target = ?self.latch.target(), "wake-up time reached, playing alarm");
        if let Err(e) = self.player.play(&self.config.alarm_clip) {
            warn!(error = %e, clip = %self.config.alarm_clip, "failed to play alarm");
        }
        true
    }

    /// Runs the loop until a fatal error.
    pub async fn run(&mut self) -> DeviceResult<()> {
        self.config.validate()?;
        info!(
            calendar_id = %self.config.calendar_id,
            poll_secs = self.config.poll_interval.as_secs(),
            mode = %self.config.alarm_mode,
            "device loop started"
        );

        let mut poller = tokio::time::interval(self.config.poll_interval);
        poller.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = poller.tick() => {
                    match self.poll_cycle(Instant::now()).await? {
                        Some(delay) => poller.reset_after(delay),
                        None => poller.reset(),
                    }
                }
                _ = ticker.tick() => {
                    self.tick()?;
                }
            }
        }
    }
}
