//! Desktop simulator for the feedclock baby-feeding tracker.
//!
//! Runs the real application loop against an SDL2 window via
//! `embedded-graphics-simulator`, with an in-memory feed store seeded with a
//! plausible history.
//!
//! # Key bindings
//!
//! | Key   | Action                        |
//! |-------|-------------------------------|
//! | Right | Skip the clock ahead a minute |
//! | Up    | Skip the clock ahead an hour  |
//! | L     | Toggle daylight / night light |
//! | F     | Fail the next store writes    |
//! | Q     | Quit                          |
//!
//! Holding the mouse button down is a touch.

use std::convert::Infallible;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info};

use feedclock_core::app::{FeedClockApp, TICK_INTERVAL_MS};
use feedclock_core::display_manager::DisplayManager;
use feedclock_core::peripherals::{AmbientLight, Backlight, Clock, TouchSource};
use feedclock_core::store::{FeedSession, MemoryStore};
use feedclock_core::time::{SECS_PER_HOUR, SECS_PER_MINUTE, Timestamp};
use feedclock_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Seeded history: the last feed ended this long ago
const LAST_FEED_AGE_SECS: i64 = 95 * SECS_PER_MINUTE;

/// Seeded history: the last feed lasted this long
const LAST_FEED_LENGTH_SECS: i64 = 20 * SECS_PER_MINUTE;

const SEEDED_FEED_COUNT: u32 = 3;

const DAYLIGHT_LUX: u32 = 500;
const NIGHT_LUX: u32 = 5;

// ---------------------------------------------------------------------------
// Simulated peripherals
// ---------------------------------------------------------------------------

/// Host wall clock (UTC treated as local), plus a skew the keyboard adds to.
struct SimClock {
    skew_secs: i64,
}

impl SimClock {
    fn new() -> Self {
        Self { skew_secs: 0 }
    }

    fn skip(&mut self, secs: i64) {
        self.skew_secs += secs;
        info!("Clock skipped ahead {} s (skew {} s)", secs, self.skew_secs);
    }
}

impl Clock for SimClock {
    fn now(&mut self) -> Timestamp {
        let host_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        Timestamp::from_local_secs(host_secs + self.skew_secs)
    }
}

/// Mouse button state.
#[derive(Default)]
struct SimTouch {
    pressed: bool,
}

impl TouchSource for SimTouch {
    async fn poll(&mut self) -> bool {
        self.pressed
    }
}

/// The window has no backlight; levels are only logged.
#[derive(Default)]
struct SimBacklight {
    level: u8,
}

impl Backlight for SimBacklight {
    type Error = Infallible;

    async fn set_brightness(&mut self, level: u8) -> Result<(), Self::Error> {
        if level % 25 == 0 && level != self.level {
            debug!("Backlight {}", level);
        }
        self.level = level;
        Ok(())
    }
}

/// Room light, switched between day and night from the keyboard.
struct SimLight {
    lux: u32,
}

impl SimLight {
    fn toggle(&mut self) {
        self.lux = if self.lux == DAYLIGHT_LUX { NIGHT_LUX } else { DAYLIGHT_LUX };
        info!("Room light now {} lx", self.lux);
    }
}

impl AmbientLight for SimLight {
    type Error = Infallible;

    async fn read_lux(&mut self) -> Result<u32, Self::Error> {
        Ok(self.lux)
    }
}

/// Blocking delay; the simulator runs everything on one thread.
struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}

type SimApp = FeedClockApp<
    SimClock,
    SimTouch,
    DisplayManager<SimulatorDisplay<Rgb565>, SimBacklight, SimLight, StdDelay>,
    MemoryStore,
>;

fn seeded_store(now: Timestamp) -> MemoryStore {
    let end = now.offset_secs(-LAST_FEED_AGE_SECS);
    let session = FeedSession {
        start: end.offset_secs(-LAST_FEED_LENGTH_SECS),
        end,
        count: SEEDED_FEED_COUNT,
    };
    info!("Seeding store: {} .. {} (#{})", session.start, session.end, session.count);
    MemoryStore::with_session(&session)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting feedclock simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: Right=+1min  Up=+1h  L=day/night  F=fail writes  Q=Quit; click to touch");

    let display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Feedclock Simulator", &output_settings);

    let mut clock = SimClock::new();
    let store = seeded_store(clock.now());
    let light = SimLight { lux: DAYLIGHT_LUX };
    let manager = DisplayManager::new(display, SimBacklight::default(), light, StdDelay);
    let mut app: SimApp = FeedClockApp::new(clock, SimTouch::default(), manager, store);

    // Either way the screen now shows something: the info page or the error
    let mut stopped = match block_on(app.start()) {
        Ok(()) => false,
        Err(e) => {
            error!("Start failed: {}", e);
            true
        }
    };

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(app.display().target());

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::Right => app.clock_mut().skip(SECS_PER_MINUTE),
                    Keycode::Up => app.clock_mut().skip(SECS_PER_HOUR),
                    Keycode::L => app.display_mut().ambient_mut().toggle(),
                    Keycode::F => {
                        info!("Store writes will fail");
                        app.store_mut().remote_mut().set_fail_writes(true);
                    }
                    _ => {}
                },

                SimulatorEvent::MouseButtonDown { .. } => app.touch_mut().pressed = true,
                SimulatorEvent::MouseButtonUp { .. } => app.touch_mut().pressed = false,

                _ => {}
            }
        }

        if !stopped {
            if let Err(e) = block_on(app.step()) {
                error!("Feed clock stopped: {}", e);
                stopped = true;
            }
        }

        window.update(app.display().target());
        std::thread::sleep(Duration::from_millis(TICK_INTERVAL_MS as u64));
    }

    info!("Simulator exiting");
}
