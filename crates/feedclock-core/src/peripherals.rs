//! Capabilities the application runner needs from the board
//!
//! Each trait is one seam between the platform-independent loop and the
//! hardware (or the simulator). Async methods let the firmware await bus and
//! network I/O on the executor; the runner still awaits every call to
//! completion before it does anything else.

use core::fmt::Debug;

use crate::time::Timestamp;
use crate::ui::PageId;

/// Polled touchscreen.
#[allow(async_fn_in_trait)]
pub trait TouchSource {
    /// `true` while at least one touch point is registered. No debouncing.
    async fn poll(&mut self) -> bool;
}

/// Wall clock in naive local time.
pub trait Clock {
    fn now(&mut self) -> Timestamp;
}

/// Panel backlight, level 0 (off) to 100 (full).
#[allow(async_fn_in_trait)]
pub trait Backlight {
    type Error: Debug;

    async fn set_brightness(&mut self, level: u8) -> Result<(), Self::Error>;
}

/// Ambient light sensor behind automatic brightness.
#[allow(async_fn_in_trait)]
pub trait AmbientLight {
    type Error: Debug;

    /// Current illuminance in lux.
    async fn read_lux(&mut self) -> Result<u32, Self::Error>;
}

/// What the runner asks of the screen.
#[allow(async_fn_in_trait)]
pub trait FeedDisplay {
    type Error: Debug;

    /// Clear the screen and lay out `page` with blank fields.
    async fn show_page(&mut self, page: PageId) -> Result<(), Self::Error>;

    /// Update the numeric fields of the current page by index, redrawing
    /// only the ones whose text changed.
    async fn set_fields(&mut self, values: &[u32]) -> Result<(), Self::Error>;

    /// Step the backlight one level at a time from `from` to `to`, waiting
    /// `step_delay_ms` after each step. Turns automatic brightness off.
    async fn ramp_brightness(&mut self, from: u8, to: u8, step_delay_ms: u32)
    -> Result<(), Self::Error>;

    /// Hand the backlight to the ambient light sensor until the next ramp.
    async fn enable_auto_brightness(&mut self) -> Result<(), Self::Error>;

    /// Called once per tick. While automatic brightness is on, periodically
    /// re-reads the ambient light and adjusts the backlight.
    async fn track_ambient(&mut self) -> Result<(), Self::Error>;

    /// Replace the screen with an error message at full brightness.
    async fn show_error(&mut self, message: &str) -> Result<(), Self::Error>;
}

/// Fixed wall clock, advanced by hand. Used by tests and headless runs.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self { now }
    }

    pub fn advance_secs(&mut self, secs: i64) {
        self.now = self.now.offset_secs(secs);
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Timestamp {
        self.now
    }
}

/// Consecutive failures of a polled peripheral, for rate-limited logging.
///
/// A bus that stays down fails on every tick; only the first failure of a
/// streak and every `every`-th one after it are worth a log line.
#[derive(Debug, Clone, Copy)]
pub struct FailureStreak {
    every: u32,
    count: u32,
}

impl FailureStreak {
    pub const fn new(every: u32) -> Self {
        Self { every, count: 0 }
    }

    /// Count a failure; `true` when this one should be logged.
    pub fn fail(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.every == 0 || (self.count - 1) % self.every == 0
    }

    /// End the streak, returning its length if there was one.
    pub fn recover(&mut self) -> Option<u32> {
        match core::mem::take(&mut self.count) {
            0 => None,
            n => Some(n),
        }
    }
}
