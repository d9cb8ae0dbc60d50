//! Color definitions
//!
//! RGB565: red 5 bits, green 6 bits, blue 5 bits.
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::Rgb565;

/// Info screen background - warm cream
pub const INFO_BACKGROUND: Rgb565 = Rgb565::new(250 >> 3, 236 >> 2, 214 >> 3);

/// Info screen text - near black
pub const INFO_TEXT: Rgb565 = Rgb565::new(20 >> 3, 20 >> 2, 24 >> 3);

/// Info screen captions - muted brown
pub const INFO_CAPTION: Rgb565 = Rgb565::new(120 >> 3, 96 >> 2, 80 >> 3);

/// Timer screen background - night blue
pub const TIMER_BACKGROUND: Rgb565 = Rgb565::new(16 >> 3, 24 >> 2, 48 >> 3);

/// Timer screen text - white
pub const TIMER_TEXT: Rgb565 = Rgb565::new(31, 63, 31);

/// Timer screen captions - soft gray-blue
pub const TIMER_CAPTION: Rgb565 = Rgb565::new(150 >> 3, 164 >> 2, 200 >> 3);

/// Error message - red
pub const ERROR_TEXT: Rgb565 = Rgb565::new(31, 0, 0);
