//! Hardware-independent core library for feedclock
//!
//! This crate contains all platform-agnostic logic of the baby-feeding
//! clock: time arithmetic, the remote feed store, Adafruit IO wire format,
//! page rendering, the mode controller and the application runner.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod app;
pub mod app_state;
pub mod clock;
pub mod cloud;
pub mod config;
pub mod controller;
pub mod display_manager;
pub mod pages;
pub mod peripherals;
pub mod store;
pub mod time;
pub mod ui;
