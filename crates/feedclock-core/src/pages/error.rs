//! Error page
//!
//! Displays a centered message naming the failure that stopped the loop.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::app_state::{ERROR_MESSAGE_CAPACITY, ErrorMessage};
use crate::pages::Page;
use crate::pages::constants::{ERROR_HINT_Y_PX, ERROR_MESSAGE_Y_PX};
use crate::pages::draw_centered;
use crate::ui::colors::ERROR_TEXT;
use crate::ui::FONT_10X20_CHAR_HEIGHT_PX;
use crate::ui::core::PageId;

/// Characters that fit on one `FONT_10X20` line of the panel.
const LINE_CHARS: usize = 32;

/// Static once drawn: the message is set before the page goes on screen.
pub struct ErrorPage {
    bounds: Rectangle,
    message: ErrorMessage,
}

impl ErrorPage {
    pub fn new(bounds: Rectangle) -> Self {
        let mut page = Self {
            bounds,
            message: ErrorMessage::new(),
        };
        page.set_message("Something went wrong");
        page
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Replace the message, cutting it at [`ERROR_MESSAGE_CAPACITY`] bytes.
    pub fn set_message(&mut self, message: &str) {
        self.message.clear();
        for c in message.chars() {
            if self.message.push(c).is_err() {
                break;
            }
        }
    }

    /// The message split in two lines at the last space that fits.
    fn lines(&self) -> (&str, &str) {
        let text = self.message.as_str();
        if text.len() <= LINE_CHARS {
            return (text, "");
        }
        let mut split = LINE_CHARS;
        while !text.is_char_boundary(split) {
            split -= 1;
        }
        match text[..split].rfind(' ') {
            Some(space) => (&text[..space], text[space + 1..].trim_start()),
            None => (&text[..split], &text[split..]),
        }
    }
}

impl Page for ErrorPage {
    fn id(&self) -> PageId {
        PageId::Error
    }

    fn title(&self) -> &str {
        "Error"
    }

    fn set_fields(&mut self, _values: &[u32]) -> bool {
        // No fields on the error page
        false
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(display)?;

        let (first, second) = self.lines();
        draw_centered(display, first, ERROR_MESSAGE_Y_PX, &FONT_10X20, ERROR_TEXT)?;
        if !second.is_empty() {
            draw_centered(
                display,
                second,
                ERROR_MESSAGE_Y_PX + FONT_10X20_CHAR_HEIGHT_PX as i32,
                &FONT_10X20,
                ERROR_TEXT,
            )?;
        }

        draw_centered(
            display,
            "Restarting...",
            ERROR_HINT_Y_PX,
            &FONT_10X20,
            Rgb565::WHITE,
        )
    }

    fn draw_changes<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        _display: &mut D,
    ) -> Result<(), D::Error> {
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        false
    }

    fn mark_clean(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> ErrorPage {
        ErrorPage::new(Rectangle::new(Point::zero(), Size::new(320, 240)))
    }

    #[test]
    fn test_short_message_is_one_line() {
        let mut page = page();
        page.set_message("WiFi connection failed");
        assert_eq!(page.lines(), ("WiFi connection failed", ""));
    }

    #[test]
    fn test_long_message_wraps_at_space() {
        let mut page = page();
        page.set_message("Remote store error: read failed for feed-count");
        let (first, second) = page.lines();
        assert!(first.len() <= LINE_CHARS);
        assert!(!first.ends_with(' '));
        assert_eq!(first, "Remote store error: read failed");
        assert_eq!(second, "for feed-count");
    }

    #[test]
    fn test_message_is_truncated_to_capacity() {
        let mut page = page();
        let long = "x".repeat(100);
        page.set_message(&long);
        assert_eq!(page.message().len(), ERROR_MESSAGE_CAPACITY);
    }
}
