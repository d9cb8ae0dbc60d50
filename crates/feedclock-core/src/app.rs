//! Application runner
//!
//! Owns the capabilities and the controller state, and drives the polling
//! loop: hydrate the feeding history, bring up the info screen, then on
//! every tick sample touch and clock, run the controller and carry out its
//! effects one after another.
//!
//! Any failure is fatal. It is logged, the error screen is shown and the
//! error is returned so the platform can decide how to restart.

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::app_state::{AppError, AppRunState, error_message};
use crate::controller::{self, ControllerState, Effect, Effects, FADE_STEP_DELAY_MS};
use crate::peripherals::{Clock, FeedDisplay, TouchSource};
use crate::store::{FeedStore, RemoteStore};
use crate::ui::MAX_BRIGHTNESS;

/// Pause between two polling ticks.
pub const TICK_INTERVAL_MS: u32 = 50;

pub struct FeedClockApp<C, T, D, S> {
    clock: C,
    touch: T,
    display: D,
    store: FeedStore<S>,
    run_state: AppRunState,
    controller: Option<ControllerState>,
}

impl<C, T, D, S> FeedClockApp<C, T, D, S>
where
    C: Clock,
    T: TouchSource,
    D: FeedDisplay,
    S: RemoteStore,
{
    pub fn new(clock: C, touch: T, display: D, remote: S) -> Self {
        Self {
            clock,
            touch,
            display,
            store: FeedStore::new(remote),
            run_state: AppRunState::Uninitialized,
            controller: None,
        }
    }

    pub fn run_state(&self) -> AppRunState {
        self.run_state
    }

    /// Controller state, once the history is loaded.
    pub fn controller(&self) -> Option<&ControllerState> {
        self.controller.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn store(&self) -> &FeedStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeedStore<S> {
        &mut self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn touch_mut(&mut self) -> &mut T {
        &mut self.touch
    }

    /// Load the feeding history and bring up the info screen.
    pub async fn start(&mut self) -> Result<(), AppError> {
        match self.try_start().await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err).await),
        }
    }

    /// Run one polling tick.
    pub async fn step(&mut self) -> Result<(), AppError> {
        if self.run_state != AppRunState::Running {
            warn!("Tick ignored in state {:?}", self.run_state);
            return Ok(());
        }
        match self.try_step().await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err).await),
        }
    }

    /// Start, then tick every `tick_ms` until something fails.
    pub async fn run<Dl: DelayNs>(
        &mut self,
        delay: &mut Dl,
        tick_ms: u32,
    ) -> Result<Infallible, AppError> {
        self.start().await?;
        info!("Entering main loop");
        loop {
            self.step().await?;
            delay.delay_ms(tick_ms).await;
        }
    }

    async fn try_start(&mut self) -> Result<(), AppError> {
        self.run_state = AppRunState::LoadingHistory;
        let history = self.store.load().await?;

        let now = self.clock.now();
        let (state, effects) = controller::boot(history, now);
        self.controller = Some(state);
        self.apply(effects).await?;

        info!("Feed clock running");
        self.run_state = AppRunState::Running;
        Ok(())
    }

    async fn try_step(&mut self) -> Result<(), AppError> {
        let Some(state) = self.controller else {
            return Ok(());
        };

        let touched = self.touch.poll().await;
        let now = self.clock.now();
        let (next, effects) = controller::tick(state, now, touched);
        if next.mode != state.mode {
            info!("Mode {:?} -> {:?} at {}", state.mode, next.mode, now);
        }
        self.controller = Some(next);
        self.apply(effects).await?;
        self.display
            .track_ambient()
            .await
            .map_err(AppError::display)
    }

    async fn apply(&mut self, effects: Effects) -> Result<(), AppError> {
        for effect in effects {
            debug!("Effect: {:?}", effect);
            match effect {
                Effect::FadeOut => self
                    .display
                    .ramp_brightness(MAX_BRIGHTNESS, 0, FADE_STEP_DELAY_MS)
                    .await
                    .map_err(AppError::display)?,
                Effect::FadeIn => {
                    self.display
                        .ramp_brightness(0, MAX_BRIGHTNESS, FADE_STEP_DELAY_MS)
                        .await
                        .map_err(AppError::display)?;
                    self.display
                        .enable_auto_brightness()
                        .await
                        .map_err(AppError::display)?;
                }
                Effect::ShowPage(page) => self
                    .display
                    .show_page(page)
                    .await
                    .map_err(AppError::display)?,
                Effect::SetFields(values) => self
                    .display
                    .set_fields(&values)
                    .await
                    .map_err(AppError::display)?,
                Effect::PushSession(session) => self.store.push(&session).await?,
            }
        }
        Ok(())
    }

    async fn fail(&mut self, err: AppError) -> AppError {
        error!("{}", err);
        self.run_state = AppRunState::Error;

        let message = error_message(&err);
        if let Err(display_err) = self.display.show_error(&message).await {
            error!("Could not show error screen: {:?}", display_err);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripherals::ManualClock;
    use crate::store::{FeedKey, FeedSession, MemoryStore, RemoteStoreError};
    use crate::time::Timestamp;
    use crate::ui::PageId;
    use embassy_futures::block_on;

    extern crate alloc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[derive(Default)]
    struct FakeTouch {
        pending: bool,
    }

    impl TouchSource for FakeTouch {
        async fn poll(&mut self) -> bool {
            core::mem::take(&mut self.pending)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Ramp(u8, u8),
        Page(PageId),
        Fields(Vec<u32>),
        Auto,
        Error(String),
    }

    /// Records every call except `track_ambient`, which is only counted.
    #[derive(Default)]
    struct RecordingDisplay {
        calls: Vec<Call>,
        tracks: usize,
    }

    impl RecordingDisplay {
        fn take(&mut self) -> Vec<Call> {
            core::mem::take(&mut self.calls)
        }
    }

    impl FeedDisplay for RecordingDisplay {
        type Error = Infallible;

        async fn show_page(&mut self, page: PageId) -> Result<(), Self::Error> {
            self.calls.push(Call::Page(page));
            Ok(())
        }

        async fn set_fields(&mut self, values: &[u32]) -> Result<(), Self::Error> {
            self.calls.push(Call::Fields(values.to_vec()));
            Ok(())
        }

        async fn ramp_brightness(
            &mut self,
            from: u8,
            to: u8,
            _step_delay_ms: u32,
        ) -> Result<(), Self::Error> {
            self.calls.push(Call::Ramp(from, to));
            Ok(())
        }

        async fn enable_auto_brightness(&mut self) -> Result<(), Self::Error> {
            self.calls.push(Call::Auto);
            Ok(())
        }

        async fn track_ambient(&mut self) -> Result<(), Self::Error> {
            self.tracks += 1;
            Ok(())
        }

        async fn show_error(&mut self, message: &str) -> Result<(), Self::Error> {
            self.calls.push(Call::Error(message.to_string()));
            Ok(())
        }
    }

    type TestApp = FeedClockApp<ManualClock, FakeTouch, RecordingDisplay, MemoryStore>;

    fn at(text: &str) -> Timestamp {
        Timestamp::parse(text).unwrap()
    }

    fn history() -> FeedSession {
        FeedSession {
            start: at("2024-03-05 08:00:00"),
            end: at("2024-03-05 08:20:00"),
            count: 2,
        }
    }

    fn app(now: &str) -> TestApp {
        FeedClockApp::new(
            ManualClock::new(at(now)),
            FakeTouch::default(),
            RecordingDisplay::default(),
            MemoryStore::with_session(&history()),
        )
    }

    fn touch_after(app: &mut TestApp, secs: i64) -> Result<(), AppError> {
        app.clock_mut().advance_secs(secs);
        app.touch_mut().pending = true;
        block_on(app.step())
    }

    #[test]
    fn test_start_brings_up_info_screen() {
        let mut app = app("2024-03-05 09:00:00");
        block_on(app.start()).unwrap();

        assert_eq!(app.run_state(), AppRunState::Running);
        assert_eq!(app.controller().unwrap().history, history());
        assert_eq!(
            app.display_mut().take(),
            [
                Call::Ramp(100, 0),
                Call::Page(PageId::Info),
                Call::Ramp(0, 100),
                Call::Auto
            ]
        );

        block_on(app.step()).unwrap();
        assert_eq!(app.display_mut().take(), [Call::Fields(vec_of(&[0, 40, 2]))]);
    }

    #[test]
    fn test_feeding_is_timed_and_saved() {
        let mut app = app("2024-03-05 09:00:00");
        block_on(app.start()).unwrap();
        block_on(app.step()).unwrap();
        app.display_mut().take();

        touch_after(&mut app, 6).unwrap();
        assert_eq!(
            app.display_mut().take(),
            [
                Call::Ramp(100, 0),
                Call::Page(PageId::Timer),
                Call::Ramp(0, 100),
                Call::Auto
            ]
        );

        app.clock_mut().advance_secs(61);
        block_on(app.step()).unwrap();
        assert_eq!(app.display_mut().take(), [Call::Fields(vec_of(&[0, 1]))]);

        touch_after(&mut app, 64).unwrap();
        assert_eq!(
            app.display_mut().take(),
            [
                Call::Ramp(100, 0),
                Call::Page(PageId::Info),
                Call::Ramp(0, 100),
                Call::Auto
            ]
        );

        let remote = app.store().remote();
        assert_eq!(remote.get(FeedKey::Start), Some("2024-03-05 09:00:06"));
        assert_eq!(remote.get(FeedKey::End), Some("2024-03-05 09:02:11"));
        assert_eq!(remote.get(FeedKey::Count), Some("3"));
        assert_eq!(remote.writes().len(), 3);
    }

    #[test]
    fn test_light_sensor_tracked_every_running_tick() {
        let mut app = app("2024-03-05 09:00:00");
        block_on(app.step()).unwrap();
        assert_eq!(app.display_mut().tracks, 0);

        block_on(app.start()).unwrap();
        assert_eq!(app.display_mut().tracks, 0);
        for _ in 0..3 {
            block_on(app.step()).unwrap();
        }
        touch_after(&mut app, 6).unwrap();
        assert_eq!(app.display_mut().tracks, 4);
    }

    #[test]
    fn test_history_failure_shows_error() {
        let mut app = app("2024-03-05 09:00:00");
        app.store_mut().remote_mut().set_fail_reads(true);

        let err = block_on(app.start()).unwrap_err();
        assert_eq!(
            err,
            AppError::RemoteStore(RemoteStoreError::read_failed(FeedKey::Start))
        );
        assert_eq!(app.run_state(), AppRunState::Error);
        assert_eq!(
            app.display_mut().take(),
            [Call::Error(
                "Remote store error: feed-start: read failed".to_string()
            )]
        );

        // no further ticks once stopped
        block_on(app.step()).unwrap();
        assert!(app.display_mut().take().is_empty());
    }

    #[test]
    fn test_save_failure_stops_loop() {
        let mut app = app("2024-03-05 09:00:00");
        block_on(app.start()).unwrap();
        touch_after(&mut app, 10).unwrap();
        app.store_mut().remote_mut().set_fail_writes(true);

        let err = touch_after(&mut app, 300).unwrap_err();
        assert_eq!(
            err,
            AppError::RemoteStore(RemoteStoreError::write_failed(FeedKey::Start))
        );
        assert_eq!(app.run_state(), AppRunState::Error);
        let calls = app.display_mut().take();
        assert!(matches!(calls.last(), Some(Call::Error(_))));
    }

    fn vec_of(values: &[u32]) -> Vec<u32> {
        values.to_vec()
    }
}
