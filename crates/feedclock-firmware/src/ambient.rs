//! BH1750 ambient light sensor behind automatic brightness

use bh1750_embedded::{Address, Resolution, r#async::Bh1750Async};
use embedded_hal_async::i2c::I2c;
use feedclock_core::app_state::{ErrorMessage, debug_message};
use feedclock_core::peripherals::AmbientLight;
use thiserror_no_std::Error;

#[derive(Error, Debug)]
#[error("BH1750 measurement failed: {0}")]
pub struct AmbientError(ErrorMessage);

pub struct Bh1750Ambient<I> {
    sensor: Bh1750Async<I, embassy_time::Delay>,
}

impl<I: I2c> Bh1750Ambient<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Bh1750Async::<I, embassy_time::Delay>::new(
                i2c,
                embassy_time::Delay,
                Address::Low,
            ),
        }
    }
}

impl<I: I2c> AmbientLight for Bh1750Ambient<I> {
    type Error = AmbientError;

    async fn read_lux(&mut self) -> Result<u32, Self::Error> {
        self.sensor
            .one_time_measurement(Resolution::High)
            .await
            // float-to-int casts saturate; negative noise reads as dark
            .map(|lux| lux as u32)
            .map_err(|e| AmbientError(debug_message(e)))
    }
}
