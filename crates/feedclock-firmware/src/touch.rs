//! FT6336U capacitive touch panel, polled over I2C
//!
//! Only presence matters, so a poll is a single read of the touch-status
//! register rather than a full point report.

use embedded_hal_async::i2c::I2c;
use feedclock_core::peripherals::{FailureStreak, TouchSource};
use log::{info, warn};

/// FT6336U I2C address
pub const I2C_ADDR: u8 = 0x38;

/// Touch status register; the low nibble holds the number of touch points
pub const ADDR_TD_STATUS: u8 = 0x02;

const TOUCH_POINTS_MASK: u8 = 0x0F;

/// The controller tracks at most two points; larger counts are noise.
const MAX_TOUCH_POINTS: u8 = 2;

/// Polls between two warnings while the panel keeps failing (five seconds)
const FAILURE_LOG_INTERVAL: u32 = 100;

pub struct Ft6336uTouch<I2C> {
    i2c: I2C,
    failures: FailureStreak,
}

impl<I2C: I2c> Ft6336uTouch<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            failures: FailureStreak::new(FAILURE_LOG_INTERVAL),
        }
    }
}

impl<I2C: I2c> TouchSource for Ft6336uTouch<I2C> {
    async fn poll(&mut self) -> bool {
        let mut status = [0u8; 1];
        match self
            .i2c
            .write_read(I2C_ADDR, &[ADDR_TD_STATUS], &mut status)
            .await
        {
            Ok(()) => {
                if let Some(missed) = self.failures.recover() {
                    info!("Touch panel back after {} failed polls", missed);
                }
                (1..=MAX_TOUCH_POINTS).contains(&(status[0] & TOUCH_POINTS_MASK))
            }
            Err(e) => {
                // A missed poll reads as "not touched"; the next tick retries
                if self.failures.fail() {
                    warn!("Touch read failed: {:?}", e);
                }
                false
            }
        }
    }
}
