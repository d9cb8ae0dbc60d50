//! Mode controller
//!
//! The whole feeding workflow as a pure state machine. Every tick the runner
//! passes in the current time and whether the screen is touched; the
//! controller returns its next state and the list of effects the runner must
//! carry out, in order.
//!
//! ```text
//!            touch (> 5 s after last wake)
//!   Info ─────────────────────────────────▶ Timer
//!    ▲ │                                     │
//!    │ │ 30 s idle        touch              │
//!    │ ▼                                     │
//!   Dimmed ──── touch ──▶ Info ◀─────────────┘  (push session)
//! ```

use crate::store::FeedSession;
use crate::time::{Timestamp, elapsed};
use crate::ui::PageId;

/// Idle time before the info screen fades to black.
pub const DIM_DOWN_DELAY_SECS: u64 = 30;

/// Minimum time between waking the screen and starting a feeding.
pub const WAKE_DEBOUNCE_SECS: u64 = 5;

/// Wait after each brightness level during a fade.
pub const FADE_STEP_DELAY_MS: u32 = 5;

/// Most effects a single tick produces.
pub const MAX_EFFECTS: usize = 4;

/// Values for the numeric fields of the current page, by index.
pub type FieldValues = heapless::Vec<u32, 3>;

pub type Effects = heapless::Vec<Effect, MAX_EFFECTS>;

/// Work the runner performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ramp the backlight from full to off
    FadeOut,
    /// Ramp the backlight from off to full
    FadeIn,
    /// Clear the screen and lay out a page
    ShowPage(PageId),
    /// Update the current page's fields in place
    SetFields(FieldValues),
    /// Persist a completed feeding
    PushSession(FeedSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Info,
    Timer,
}

/// Backlight state of the info screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Lit since the last wake-up touch (or mode change)
    Bright { since: Timestamp },
    Dimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub mode: Mode,
    pub screen: Screen,
    /// Start of the running feeding; meaningful in [`Mode::Timer`]
    pub session_start: Timestamp,
    /// Last completed feeding and today's count
    pub history: FeedSession,
    /// Hours and minutes currently shown, `None` right after a layout switch
    pub rendered: Option<(u8, u8)>,
}

impl ControllerState {
    pub fn is_dimmed(&self) -> bool {
        self.screen == Screen::Dimmed
    }
}

/// Initial state and the effects that bring up the info screen.
pub fn boot(history: FeedSession, now: Timestamp) -> (ControllerState, Effects) {
    let state = ControllerState {
        mode: Mode::Info,
        screen: Screen::Bright { since: now },
        session_start: history.start,
        history,
        rendered: None,
    };
    (state, switch_layout(PageId::Info, None))
}

/// Advance the controller by one polling tick.
pub fn tick(state: ControllerState, now: Timestamp, touched: bool) -> (ControllerState, Effects) {
    match state.mode {
        Mode::Info => tick_info(state, now, touched),
        Mode::Timer => tick_timer(state, now, touched),
    }
}

fn tick_info(
    mut state: ControllerState,
    now: Timestamp,
    touched: bool,
) -> (ControllerState, Effects) {
    let since = match state.screen {
        Screen::Dimmed => {
            if !touched {
                return (state, Effects::new());
            }
            state.screen = Screen::Bright { since: now };
            return (state, effects([Effect::FadeIn]));
        }
        Screen::Bright { since } => since,
    };

    let idle_secs = elapsed(&now, &since).total_secs;

    if touched && idle_secs > WAKE_DEBOUNCE_SECS {
        state.mode = Mode::Timer;
        state.session_start = now;
        if !now.same_date(&state.history.end) {
            state.history.count = 0;
        }
        state.rendered = None;
        return (state, switch_layout(PageId::Timer, None));
    }

    if !touched && idle_secs > DIM_DOWN_DELAY_SECS {
        state.screen = Screen::Dimmed;
        return (state, effects([Effect::FadeOut]));
    }

    let reference = state.history.end;
    let count = state.history.count;
    let update = refresh_fields(&mut state, &now, &reference, Some(count));
    (state, effects(update))
}

fn tick_timer(
    mut state: ControllerState,
    now: Timestamp,
    touched: bool,
) -> (ControllerState, Effects) {
    if touched {
        let session = FeedSession {
            start: state.session_start,
            end: now,
            count: state.history.count.saturating_add(1),
        };
        state.mode = Mode::Info;
        state.screen = Screen::Bright { since: now };
        state.history = session;
        state.rendered = None;
        return (state, switch_layout(PageId::Info, Some(session)));
    }

    let reference = state.session_start;
    let update = refresh_fields(&mut state, &now, &reference, None);
    (state, effects(update))
}

/// Field update for the time since `reference`, if hours or minutes moved.
fn refresh_fields(
    state: &mut ControllerState,
    now: &Timestamp,
    reference: &Timestamp,
    count: Option<u32>,
) -> Option<Effect> {
    let since = elapsed(now, reference);
    let shown = (since.hours, since.minutes);
    if state.rendered == Some(shown) {
        return None;
    }
    state.rendered = Some(shown);

    let mut values = FieldValues::new();
    values.push(since.hours.into()).ok();
    values.push(since.minutes.into()).ok();
    if let Some(count) = count {
        values.push(count).ok();
    }
    Some(Effect::SetFields(values))
}

fn switch_layout(page: PageId, completed: Option<FeedSession>) -> Effects {
    let mut out = effects([Effect::FadeOut, Effect::ShowPage(page), Effect::FadeIn]);
    if let Some(session) = completed {
        out.push(Effect::PushSession(session)).ok();
    }
    out
}

fn effects(list: impl IntoIterator<Item = Effect>) -> Effects {
    let mut out = Effects::new();
    for effect in list {
        if out.push(effect).is_err() {
            break;
        }
    }
    out
}
