//! The wakecal device loop.
//!
//! - [`Controller`] - the tick/poll loop that drives everything below
//! - [`Clock`] - wall clock capability ([`SystemClock`], [`MonotonicClock`])
//! - [`Renderer`] / [`Presenter`] - label slots and what goes in them
//! - [`SoundPlayer`] - alarm playback ([`CommandPlayer`], [`BellPlayer`])
//! - [`AlarmLatch`] - fires the alarm once per planned target
//! - [`RetryPolicy`] - what happens after a failed poll
//!
//! Hardware is reached only through the capability traits, so the loop runs
//! the same against a terminal, a panel driver or test doubles.

pub mod alarm;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod presenter;
pub mod render;
pub mod retry;
pub mod sound;

#[cfg(test)]
mod testing;

pub use alarm::{AlarmLatch, AlarmMode, DEFAULT_LATE_LIMIT_MINUTES};
pub use clock::{Clock, ClockError, ClockResult, MonotonicClock, SystemClock};
pub use config::{DeviceConfig, offset_from_minutes};
pub use controller::{Capabilities, Controller};
pub use error::{DeviceError, DeviceResult};
pub use presenter::Presenter;
pub use render::{ConsoleRenderer, Label, Renderer};
pub use retry::{RetryPolicy, RetryState};
pub use sound::{BellPlayer, CLIP_PLACEHOLDER, CommandPlayer, SoundError, SoundPlayer};
