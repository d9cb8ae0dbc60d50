//! Display Manager: owns the panel, the backlight and the current page
//!
//! This module implements [`FeedDisplay`] on top of any `embedded-graphics`
//! target:
//! - `show_page` builds a fresh page and draws it in full
//! - `set_fields` pushes values into the current page and redraws only the
//!   fields whose text changed
//! - `ramp_brightness` fades the backlight one level per step
//! - `enable_auto_brightness` / `track_ambient` let the light sensor pick
//!   the backlight level between fades
//! - `show_error` swaps in the error page at full brightness

use core::fmt::{self, Debug};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::pages::{Page, PageWrapper};
use crate::peripherals::{AmbientLight, Backlight, FailureStreak, FeedDisplay};
use crate::ui::{
    BrightnessRamp, DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, MAX_BRIGHTNESS, PageId, ambient_level,
};

/// Ticks between two ambient light readings (one second at the default tick).
pub const AMBIENT_SAMPLE_TICKS: u32 = 20;

/// Failed light readings between two warnings (one minute of samples)
const SENSOR_FAILURE_LOG_INTERVAL: u32 = 60;

/// Failure of the panel or the backlight.
#[derive(Debug)]
pub enum DisplayError<D, B> {
    Draw(D),
    Backlight(B),
}

impl<D: Debug, B: Debug> fmt::Display for DisplayError<D, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw(e) => write!(f, "draw failed: {:?}", e),
            Self::Backlight(e) => write!(f, "backlight failed: {:?}", e),
        }
    }
}

/// Display manager that owns the display and renders the current page
pub struct DisplayManager<T, B, L, Dl>
where
    T: DrawTarget<Color = Rgb565>,
{
    target: T,
    backlight: B,
    ambient: L,
    delay: Dl,
    bounds: Rectangle,
    current_page: PageWrapper,
    brightness: u8,
    auto_brightness: bool,
    ticks_since_sample: u32,
    sensor_failures: FailureStreak,
}

impl<T, B, L, Dl> DisplayManager<T, B, L, Dl>
where
    T: DrawTarget<Color = Rgb565>,
    T::Error: Debug,
    B: Backlight,
    L: AmbientLight,
    Dl: DelayNs,
{
    /// Wrap a panel. Nothing is drawn until the first `show_page`; the
    /// backlight is assumed to be at full brightness with automatic
    /// brightness off.
    pub fn new(target: T, backlight: B, ambient: L, delay: Dl) -> Self {
        let bounds = Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        );

        Self {
            target,
            backlight,
            ambient,
            delay,
            bounds,
            current_page: PageWrapper::build(PageId::Info, bounds),
            brightness: MAX_BRIGHTNESS,
            auto_brightness: false,
            ticks_since_sample: 0,
            sensor_failures: FailureStreak::new(SENSOR_FAILURE_LOG_INTERVAL),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn backlight(&self) -> &B {
        &self.backlight
    }

    pub fn ambient_mut(&mut self) -> &mut L {
        &mut self.ambient
    }

    pub fn auto_brightness(&self) -> bool {
        self.auto_brightness
    }

    /// Last brightness level written to the backlight.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn current_page(&self) -> &PageWrapper {
        &self.current_page
    }

    async fn set_level(&mut self, level: u8) -> Result<(), DisplayError<T::Error, B::Error>> {
        self.backlight
            .set_brightness(level)
            .await
            .map_err(DisplayError::Backlight)?;
        self.brightness = level;
        Ok(())
    }

    /// Read the light sensor and move the backlight to match. A failed read
    /// keeps the current level; repeated failures are logged sparingly.
    async fn follow_ambient(&mut self) -> Result<(), DisplayError<T::Error, B::Error>> {
        match self.ambient.read_lux().await {
            Ok(lux) => {
                if let Some(missed) = self.sensor_failures.recover() {
                    info!("Light sensor back after {} failed reads", missed);
                }
                let level = ambient_level(lux);
                if level != self.brightness {
                    debug!("Ambient {} lx -> brightness {}", lux, level);
                    self.set_level(level).await?;
                }
            }
            Err(e) => {
                if self.sensor_failures.fail() {
                    warn!(
                        "Light sensor read failed, holding brightness {}: {:?}",
                        self.brightness, e
                    );
                }
            }
        }
        Ok(())
    }
}

impl<T, B, L, Dl> FeedDisplay for DisplayManager<T, B, L, Dl>
where
    T: DrawTarget<Color = Rgb565>,
    T::Error: Debug,
    B: Backlight,
    L: AmbientLight,
    Dl: DelayNs,
{
    type Error = DisplayError<T::Error, B::Error>;

    async fn show_page(&mut self, page: PageId) -> Result<(), Self::Error> {
        debug!("Building page: {:?}", page);
        self.current_page = PageWrapper::build(page, self.bounds);
        self.current_page
            .draw_page(&mut self.target)
            .map_err(DisplayError::Draw)
    }

    async fn set_fields(&mut self, values: &[u32]) -> Result<(), Self::Error> {
        if !self.current_page.set_fields(values) {
            return Ok(());
        }
        debug!("Updating {} fields: {:?}", self.current_page.title(), values);
        self.current_page
            .draw_changes(&mut self.target)
            .map_err(DisplayError::Draw)
    }

    async fn ramp_brightness(
        &mut self,
        from: u8,
        to: u8,
        step_delay_ms: u32,
    ) -> Result<(), Self::Error> {
        debug!("Fading backlight {} -> {}", from, to);
        self.auto_brightness = false;
        for level in BrightnessRamp::new(from, to) {
            self.set_level(level).await?;
            self.delay.delay_ms(step_delay_ms).await;
        }
        Ok(())
    }

    async fn enable_auto_brightness(&mut self) -> Result<(), Self::Error> {
        debug!("Automatic brightness on");
        self.auto_brightness = true;
        self.ticks_since_sample = 0;
        self.follow_ambient().await
    }

    async fn track_ambient(&mut self) -> Result<(), Self::Error> {
        if !self.auto_brightness {
            return Ok(());
        }
        self.ticks_since_sample += 1;
        if self.ticks_since_sample < AMBIENT_SAMPLE_TICKS {
            return Ok(());
        }
        self.ticks_since_sample = 0;
        self.follow_ambient().await
    }

    async fn show_error(&mut self, message: &str) -> Result<(), Self::Error> {
        info!("Showing error screen: {}", message);
        self.auto_brightness = false;
        let mut page = PageWrapper::build(PageId::Error, self.bounds);
        if let PageWrapper::Error(error_page) = &mut page {
            error_page.set_message(message);
        }
        self.current_page = page;
        self.current_page
            .draw_page(&mut self.target)
            .map_err(DisplayError::Draw)?;
        self.set_level(MAX_BRIGHTNESS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use crate::ui::brightness::{FULL_BRIGHTNESS_LUX, MIN_AUTO_BRIGHTNESS};
    use embassy_futures::block_on;

    extern crate alloc;
    use alloc::vec::Vec;

    /// Counts every pixel written.
    struct CountingTarget {
        pixels: usize,
    }

    impl OriginDimensions for CountingTarget {
        fn size(&self) -> Size {
            Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32)
        }
    }

    impl DrawTarget for CountingTarget {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.pixels += pixels.into_iter().count();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingBacklight {
        levels: Vec<u8>,
    }

    impl Backlight for RecordingBacklight {
        type Error = Infallible;

        async fn set_brightness(&mut self, level: u8) -> Result<(), Self::Error> {
            self.levels.push(level);
            Ok(())
        }
    }

    /// Light sensor with a settable reading; `None` fails the read.
    struct FakeLight {
        lux: Option<u32>,
        reads: usize,
    }

    impl AmbientLight for FakeLight {
        type Error = ();

        async fn read_lux(&mut self) -> Result<u32, Self::Error> {
            self.reads += 1;
            self.lux.ok_or(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestManager = DisplayManager<CountingTarget, RecordingBacklight, FakeLight, NoDelay>;

    fn manager() -> TestManager {
        DisplayManager::new(
            CountingTarget { pixels: 0 },
            RecordingBacklight::default(),
            FakeLight {
                lux: Some(0),
                reads: 0,
            },
            NoDelay,
        )
    }

    fn track(dm: &mut TestManager, ticks: u32) {
        for _ in 0..ticks {
            block_on(dm.track_ambient()).unwrap();
        }
    }

    #[test]
    fn test_show_page_paints_whole_screen() {
        let mut dm = manager();
        block_on(dm.show_page(PageId::Timer)).unwrap();
        assert_eq!(dm.current_page().id(), PageId::Timer);
        assert!(dm.target().pixels >= 320 * 240);
        assert!(!dm.current_page().is_dirty());
    }

    #[test]
    fn test_unchanged_fields_draw_nothing() {
        let mut dm = manager();
        block_on(dm.show_page(PageId::Info)).unwrap();
        block_on(dm.set_fields(&[1, 2, 3])).unwrap();

        dm.target_mut().pixels = 0;
        block_on(dm.set_fields(&[1, 2, 3])).unwrap();
        assert_eq!(dm.target().pixels, 0);
    }

    #[test]
    fn test_changed_field_redraws_only_its_box() {
        let mut dm = manager();
        block_on(dm.show_page(PageId::Info)).unwrap();
        block_on(dm.set_fields(&[1, 2, 3])).unwrap();

        dm.target_mut().pixels = 0;
        block_on(dm.set_fields(&[1, 3, 3])).unwrap();
        let drawn = dm.target().pixels;
        assert!(drawn > 0);
        // one 2-glyph box plus its text, far less than a full page
        assert!(drawn < 2 * 20 * 20);
    }

    #[test]
    fn test_full_fade_steps_every_level() {
        let mut dm = manager();
        block_on(dm.ramp_brightness(MAX_BRIGHTNESS, 0, 5)).unwrap();
        let levels = &dm.backlight().levels;
        assert_eq!(levels.len(), 101);
        assert_eq!(levels.first(), Some(&100));
        assert_eq!(levels.last(), Some(&0));
        assert_eq!(dm.brightness(), 0);
    }

    #[test]
    fn test_auto_brightness_follows_ambient_light() {
        let mut dm = manager();
        block_on(dm.enable_auto_brightness()).unwrap();
        assert_eq!(dm.brightness(), MIN_AUTO_BRIGHTNESS);

        dm.ambient_mut().lux = Some(FULL_BRIGHTNESS_LUX);
        track(&mut dm, AMBIENT_SAMPLE_TICKS - 1);
        assert_eq!(dm.brightness(), MIN_AUTO_BRIGHTNESS);
        track(&mut dm, 1);
        assert_eq!(dm.brightness(), MAX_BRIGHTNESS);
        assert_eq!(dm.ambient_mut().reads, 2);
    }

    #[test]
    fn test_fade_hands_backlight_back_from_sensor() {
        let mut dm = manager();
        block_on(dm.enable_auto_brightness()).unwrap();
        block_on(dm.ramp_brightness(MIN_AUTO_BRIGHTNESS, 0, 0)).unwrap();
        assert!(!dm.auto_brightness());

        // a dimmed screen stays dark whatever the room does
        dm.ambient_mut().lux = Some(FULL_BRIGHTNESS_LUX);
        track(&mut dm, 3 * AMBIENT_SAMPLE_TICKS);
        assert_eq!(dm.brightness(), 0);
        assert_eq!(dm.ambient_mut().reads, 1);
    }

    #[test]
    fn test_sensor_failure_holds_brightness() {
        let mut dm = manager();
        dm.ambient_mut().lux = None;
        block_on(dm.enable_auto_brightness()).unwrap();
        track(&mut dm, 2 * AMBIENT_SAMPLE_TICKS);
        assert_eq!(dm.brightness(), MAX_BRIGHTNESS);
        assert!(dm.backlight().levels.is_empty());

        dm.ambient_mut().lux = Some(0);
        track(&mut dm, AMBIENT_SAMPLE_TICKS);
        assert_eq!(dm.brightness(), MIN_AUTO_BRIGHTNESS);
    }

    #[test]
    fn test_show_error_restores_brightness() {
        let mut dm = manager();
        block_on(dm.enable_auto_brightness()).unwrap();
        block_on(dm.show_error("Clock sync failed")).unwrap();
        assert_eq!(dm.current_page().id(), PageId::Error);
        assert_eq!(dm.brightness(), MAX_BRIGHTNESS);
        assert!(!dm.auto_brightness());
        assert!(!dm.current_page().is_dirty());
        match dm.current_page() {
            PageWrapper::Error(page) => assert_eq!(page.message(), "Clock sync failed"),
            _ => panic!("expected error page"),
        }
    }
}
