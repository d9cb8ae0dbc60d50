// src/ui/core.rs
//! Core UI traits and types

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Page identifier for layout switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    /// Time since the last feeding and today's count
    Info,
    /// Running feeding timer
    Timer,
    /// Fatal error screen
    Error,
}

/// Trait for any UI element that can be drawn
pub trait Drawable {
    /// Draw the element to the display
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    /// Area covered by the element
    fn bounds(&self) -> Rectangle;

    /// Whether the element changed since it was last drawn
    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);
}
