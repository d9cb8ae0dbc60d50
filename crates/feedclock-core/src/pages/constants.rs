//! Layout constants shared by the pages
//!
//! All pages use `FONT_10X20`. Vertical positions are text centers.

/// Width of the ':' between hours and minutes, including padding
pub const SEPARATOR_WIDTH_PX: i32 = 10;

/// Horizontal center of the hours:minutes readout
pub const CLOCK_CENTER_X_PX: i32 = 160;

/// Glyphs reserved for an hours or minutes field
pub const CLOCK_FIELD_GLYPHS: u32 = 2;

/// Glyphs reserved for the daily count
pub const COUNT_FIELD_GLYPHS: u32 = 3;

/// Info page: caption above the since-last-feed readout
pub const INFO_SINCE_CAPTION_Y_PX: i32 = 50;

/// Info page: since-last-feed readout
pub const INFO_SINCE_Y_PX: i32 = 85;

/// Info page: caption above the daily count
pub const INFO_COUNT_CAPTION_Y_PX: i32 = 135;

/// Info page: daily count
pub const INFO_COUNT_Y_PX: i32 = 170;

/// Timer page: caption above the running timer
pub const TIMER_CAPTION_Y_PX: i32 = 80;

/// Timer page: running timer
pub const TIMER_Y_PX: i32 = 120;

/// Touch hint at the bottom of the info and timer pages
pub const HINT_Y_PX: i32 = 215;

/// Error page: message line
pub const ERROR_MESSAGE_Y_PX: i32 = 100;

/// Error page: hint line below the message
pub const ERROR_HINT_Y_PX: i32 = 160;
