//! Board bring-up for the I2C side of the device
//!
//! Order matters: the AXP2101 powers the panel and the touch controller, so
//! it is configured before anything else on the bus is touched.

use core::fmt::Debug;

use axp2101_embedded::AsyncAxp2101;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use esp_hal::{i2c::master::Config as I2cConfig, time::Rate};
use feedclock_core::app_state::AppError;
use log::{error, info};
use static_cell::StaticCell;

use crate::async_i2c_bus::{AsyncI2cDevice, I2cBus, SharedI2c};

/// AW9523 I2C address
const GPIO_EXPANDER_ADDR: u8 = 0x58;

/// AW9523 pin wired to the touch controller's interrupt line (P1_2)
const TOUCH_INT_PIN: u8 = 10;

/// Panel supply on ALDO4, in millivolts
const PANEL_SUPPLY_MV: u16 = 3300;

/// I2C peripherals the rest of the firmware keeps using after bring-up
pub struct BoardI2c {
    pub power_mgmt: AsyncAxp2101<SharedI2c>,
    pub touch: SharedI2c,
    pub light: SharedI2c,
}

/// Create the I2C0 controller at 400 kHz.
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO12<'static>,
    scl: esp_hal::peripherals::GPIO11<'static>,
) -> Result<I2cBus, AppError> {
    let i2c = esp_hal::i2c::master::I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .map_err(bring_up_failed("I2C bus"))?;

    Ok(i2c.with_sda(sda).with_scl(scl).into_async())
}

/// Share the bus, power the panel and configure the GPIO expander.
pub async fn init_i2c_hardware(i2c0: I2cBus) -> Result<BoardI2c, AppError> {
    static I2C0_BUS: StaticCell<AsyncMutex<CriticalSectionRawMutex, I2cBus>> = StaticCell::new();
    let i2c0_bus = I2C0_BUS.init(AsyncMutex::new(i2c0));

    info!("Configuring power management");
    let mut power_mgmt = AsyncAxp2101::new(AsyncI2cDevice::new(i2c0_bus));
    power_mgmt
        .init()
        .await
        .map_err(bring_up_failed("Power management"))?;

    power_mgmt
        .enable_aldo1()
        .await
        .map_err(bring_up_failed("ALDO1"))?;
    power_mgmt
        .enable_aldo2()
        .await
        .map_err(bring_up_failed("ALDO2"))?;
    power_mgmt
        .enable_aldo3()
        .await
        .map_err(bring_up_failed("ALDO3"))?;
    power_mgmt
        .enable_aldo4()
        .await
        .map_err(bring_up_failed("ALDO4"))?;
    power_mgmt
        .enable_bldo1()
        .await
        .map_err(bring_up_failed("BLDO1"))?;
    power_mgmt
        .enable_bldo2()
        .await
        .map_err(bring_up_failed("BLDO2"))?;
    power_mgmt
        .set_aldo4_voltage(PANEL_SUPPLY_MV)
        .await
        .map_err(bring_up_failed("Panel supply"))?;
    info!("Power management ready");

    info!("Configuring GPIO expander");
    let mut gpio_expander = aw9523_embedded::r#async::Aw9523Async::new(
        AsyncI2cDevice::new(i2c0_bus),
        GPIO_EXPANDER_ADDR,
    );
    gpio_expander
        .init()
        .await
        .map_err(bring_up_failed("GPIO expander"))?;
    // The panel is polled, the interrupt line only has to stay an input
    gpio_expander
        .pin_mode(TOUCH_INT_PIN, aw9523_embedded::PinMode::Input)
        .await
        .map_err(bring_up_failed("Touch interrupt pin"))?;

    Ok(BoardI2c {
        power_mgmt,
        touch: AsyncI2cDevice::new(i2c0_bus),
        light: AsyncI2cDevice::new(i2c0_bus),
    })
}

fn bring_up_failed<E: Debug>(step: &'static str) -> impl FnOnce(E) -> AppError {
    move |e| {
        error!("{} init failed: {:?}", step, e);
        AppError::hardware(step)
    }
}
