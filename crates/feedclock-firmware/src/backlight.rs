//! Panel backlight driven by the AXP2101's DLDO1 rail
//!
//! The LED driver's brightness follows the rail voltage. Level 0 switches
//! the rail off; levels 1..=100 map linearly onto the usable voltage range.

use core::fmt::{Debug, Write};

use axp2101_embedded::AsyncAxp2101;
use feedclock_core::peripherals::Backlight;
use feedclock_core::ui::MAX_BRIGHTNESS;
use log::debug;

use crate::async_i2c_bus::SharedI2c;

/// Dimmest usable rail voltage
const MIN_BACKLIGHT_MV: u16 = 2500;

/// Brightest rail voltage
const MAX_BACKLIGHT_MV: u16 = 3300;

/// Rail voltage step of the regulator
const BACKLIGHT_STEP_MV: u16 = 100;

#[derive(Debug)]
pub struct BacklightError(pub heapless::String<48>);

impl BacklightError {
    fn from_cause(cause: impl Debug) -> Self {
        let mut message = heapless::String::new();
        write!(message, "{:?}", cause).ok();
        Self(message)
    }
}

pub struct AxpBacklight {
    power_mgmt: AsyncAxp2101<SharedI2c>,
    enabled: bool,
    rail_mv: Option<u16>,
}

impl AxpBacklight {
    pub fn new(power_mgmt: AsyncAxp2101<SharedI2c>) -> Self {
        Self {
            power_mgmt,
            enabled: false,
            rail_mv: None,
        }
    }
}

/// Rail voltage for a brightness level, rounded down to a regulator step.
fn level_to_mv(level: u8) -> u16 {
    let level = level.min(MAX_BRIGHTNESS) as u32;
    let span = (MAX_BACKLIGHT_MV - MIN_BACKLIGHT_MV) as u32;
    let mv = MIN_BACKLIGHT_MV as u32 + span * level / MAX_BRIGHTNESS as u32;
    (mv as u16 / BACKLIGHT_STEP_MV) * BACKLIGHT_STEP_MV
}

impl Backlight for AxpBacklight {
    type Error = BacklightError;

    async fn set_brightness(&mut self, level: u8) -> Result<(), Self::Error> {
        if level == 0 {
            if self.enabled {
                self.power_mgmt
                    .disable_dldo1()
                    .await
                    .map_err(BacklightError::from_cause)?;
                self.enabled = false;
            }
            return Ok(());
        }

        let mv = level_to_mv(level);
        // Many fade levels share one regulator step
        if self.rail_mv != Some(mv) {
            debug!("Backlight rail {} mV", mv);
            self.power_mgmt
                .set_dldo1_voltage(mv)
                .await
                .map_err(BacklightError::from_cause)?;
            self.rail_mv = Some(mv);
        }
        if !self.enabled {
            self.power_mgmt
                .enable_dldo1()
                .await
                .map_err(BacklightError::from_cause)?;
            self.enabled = true;
        }
        Ok(())
    }
}
