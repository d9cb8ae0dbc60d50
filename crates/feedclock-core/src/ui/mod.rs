//! UI building blocks shared by the pages
//!
//! - [`core`] - the `Drawable` contract and page identifiers
//! - [`colors`] - RGB565 palette
//! - [`field`] - numeric text fields updated in place
//! - [`brightness`] - backlight fade ramps and ambient brightness

pub mod brightness;
pub mod colors;
pub mod core;
pub mod field;

pub use brightness::{BrightnessRamp, MAX_BRIGHTNESS, ambient_level};
pub use self::core::{Drawable, PageId};
pub use field::{FieldStyle, NumericField};

/// Panel width in pixels
pub const DISPLAY_WIDTH_PX: u16 = 320;

/// Panel height in pixels
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Character cell height of `FONT_10X20`
pub const FONT_10X20_CHAR_HEIGHT_PX: u32 = 20;

