//! ESP32-S3 firmware-specific modules for feedclock
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: board bring-up, the FT6336U touch panel, the AXP2101-driven
//! backlight, the BH1750 light sensor, Wi-Fi and the HTTPS client for
//! Adafruit IO.

#![no_std]

extern crate alloc;

pub mod aio_client;
pub mod ambient;
pub mod async_i2c_bus;
pub mod backlight;
pub mod clock;
pub mod hardware;
pub mod network;
pub mod secrets;
pub mod touch;
