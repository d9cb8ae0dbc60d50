//! Backlight fade ramps and ambient brightness
//!
//! Brightness is a percentage. A full fade walks every integer level from
//! one end to the other, so 100 → 0 is 101 steps.

/// Full brightness level
pub const MAX_BRIGHTNESS: u8 = 100;

/// Level automatic brightness uses in the dark; the clock stays readable
/// during night feedings without lighting up the room.
pub const MIN_AUTO_BRIGHTNESS: u8 = 10;

/// Illuminance at and above which automatic brightness is full.
pub const FULL_BRIGHTNESS_LUX: u32 = 300;

/// Backlight level for an ambient illuminance, linear between
/// [`MIN_AUTO_BRIGHTNESS`] at 0 lux and full at [`FULL_BRIGHTNESS_LUX`].
pub fn ambient_level(lux: u32) -> u8 {
    let lux = lux.min(FULL_BRIGHTNESS_LUX);
    let span = (MAX_BRIGHTNESS - MIN_AUTO_BRIGHTNESS) as u32;
    MIN_AUTO_BRIGHTNESS + (span * lux / FULL_BRIGHTNESS_LUX) as u8
}

/// Inclusive, unit-step sequence of brightness levels between two values.
#[derive(Debug, Clone)]
pub struct BrightnessRamp {
    next: Option<u8>,
    to: u8,
}

impl BrightnessRamp {
    /// Levels from `from` to `to`, both clamped to [`MAX_BRIGHTNESS`].
    pub fn new(from: u8, to: u8) -> Self {
        Self {
            next: Some(from.min(MAX_BRIGHTNESS)),
            to: to.min(MAX_BRIGHTNESS),
        }
    }
}

impl Iterator for BrightnessRamp {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let current = self.next?;
        self.next = match current.cmp(&self.to) {
            core::cmp::Ordering::Less => Some(current + 1),
            core::cmp::Ordering::Greater => Some(current - 1),
            core::cmp::Ordering::Equal => None,
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_fade_has_101_levels() {
        let down: heapless::Vec<u8, 128> = BrightnessRamp::new(100, 0).collect();
        assert_eq!(down.len(), 101);
        assert_eq!(down.first(), Some(&100));
        assert_eq!(down.last(), Some(&0));
        assert!(down.windows(2).all(|w| w[0] == w[1] + 1));

        let up: heapless::Vec<u8, 128> = BrightnessRamp::new(0, 100).collect();
        assert_eq!(up.len(), 101);
        assert_eq!(up.last(), Some(&100));
    }

    #[test]
    fn test_same_level_yields_once() {
        let levels: heapless::Vec<u8, 4> = BrightnessRamp::new(42, 42).collect();
        assert_eq!(levels.as_slice(), &[42]);
    }

    #[test]
    fn test_ambient_level_spans_dark_to_daylight() {
        assert_eq!(ambient_level(0), MIN_AUTO_BRIGHTNESS);
        assert_eq!(ambient_level(150), 55);
        assert_eq!(ambient_level(FULL_BRIGHTNESS_LUX), MAX_BRIGHTNESS);
        assert_eq!(ambient_level(50_000), MAX_BRIGHTNESS);
        assert!(ambient_level(20) < ambient_level(200));
    }

    #[test]
    fn test_levels_are_clamped() {
        let levels: heapless::Vec<u8, 8> = BrightnessRamp::new(250, 98).collect();
        assert_eq!(levels.as_slice(), &[100, 99, 98]);
    }
}
