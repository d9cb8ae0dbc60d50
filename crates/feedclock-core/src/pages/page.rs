// src/pages/page.rs
//! Core page abstraction and the enum wrapper the display manager stores.
//!
//! A [`Page`] owns its layout and its numeric fields. The display manager
//! builds a fresh page on every layout switch, draws it in full once, and
//! from then on only pushes field values and redraws what changed.
//!
//! [`PageWrapper`] holds one of the concrete pages without `dyn`, delegating
//! every [`Page`] method to the inner value.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::pages::{ErrorPage, InfoPage, TimerPage};
use crate::ui::core::PageId;

extern crate alloc;
use alloc::boxed::Box;

/// Trait every screen layout implements.
///
/// Call order for one layout:
///
/// 1. **`draw_page`** once, right after the page is built.
/// 2. **`set_fields`** whenever the runner has new values.
/// 3. **`draw_changes`** after each `set_fields` that returned `true`.
pub trait Page {
    fn id(&self) -> PageId;

    /// Human-readable title for logs.
    fn title(&self) -> &str;

    /// Assign field values by index; extra values are ignored.
    ///
    /// Returns `true` if any field's text changed.
    fn set_fields(&mut self, values: &[u32]) -> bool;

    /// Render the whole page: background, static text and every field.
    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D)
    -> Result<(), D::Error>;

    /// Render only the fields that changed since the last draw.
    fn draw_changes<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error>;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);
}

/// One of the concrete page types, boxed to keep the enum small.
pub enum PageWrapper {
    Info(Box<InfoPage>),
    Timer(Box<TimerPage>),
    Error(Box<ErrorPage>),
}

impl PageWrapper {
    /// Build a blank page for `id` covering `bounds`.
    pub fn build(id: PageId, bounds: Rectangle) -> Self {
        match id {
            PageId::Info => PageWrapper::Info(Box::new(InfoPage::new(bounds))),
            PageId::Timer => PageWrapper::Timer(Box::new(TimerPage::new(bounds))),
            PageId::Error => PageWrapper::Error(Box::new(ErrorPage::new(bounds))),
        }
    }
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Info(page) => page.id(),
            PageWrapper::Timer(page) => page.id(),
            PageWrapper::Error(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Info(page) => page.title(),
            PageWrapper::Timer(page) => page.title(),
            PageWrapper::Error(page) => page.title(),
        }
    }

    fn set_fields(&mut self, values: &[u32]) -> bool {
        match self {
            PageWrapper::Info(page) => page.set_fields(values),
            PageWrapper::Timer(page) => page.set_fields(values),
            PageWrapper::Error(page) => page.set_fields(values),
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        match self {
            PageWrapper::Info(page) => page.draw_page(display),
            PageWrapper::Timer(page) => page.draw_page(display),
            PageWrapper::Error(page) => page.draw_page(display),
        }
    }

    fn draw_changes<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        match self {
            PageWrapper::Info(page) => page.draw_changes(display),
            PageWrapper::Timer(page) => page.draw_changes(display),
            PageWrapper::Error(page) => page.draw_changes(display),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            PageWrapper::Info(page) => Page::is_dirty(page.as_ref()),
            PageWrapper::Timer(page) => Page::is_dirty(page.as_ref()),
            PageWrapper::Error(page) => Page::is_dirty(page.as_ref()),
        }
    }

    fn mark_clean(&mut self) {
        match self {
            PageWrapper::Info(page) => Page::mark_clean(page.as_mut()),
            PageWrapper::Timer(page) => Page::mark_clean(page.as_mut()),
            PageWrapper::Error(page) => Page::mark_clean(page.as_mut()),
        }
    }
}
