// src/ui/field.rs
//! Numeric text field updated in place
//!
//! A field owns a fixed box on screen. Changing its value only marks it
//! dirty when the rendered text differs, and drawing repaints just that box,
//! so same-layout updates never touch the rest of the page.

use core::fmt::Write;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::ui::core::Drawable;

/// Longest text a field can show (`u32::MAX` has ten digits).
const FIELD_TEXT_CAPACITY: usize = 10;

/// Font and colors of a field
#[derive(Clone, Copy)]
pub struct FieldStyle {
    pub font: &'static MonoFont<'static>,
    pub color: Rgb565,
    pub background: Rgb565,
}

/// Zero-padded, right-aligned number in a fixed box.
///
/// The anchor is the right edge of the box on the text's vertical center.
pub struct NumericField {
    anchor: Point,
    glyphs: u32,
    style: FieldStyle,
    value: Option<u32>,
    text: heapless::String<FIELD_TEXT_CAPACITY>,
    dirty: bool,
}

impl NumericField {
    /// A blank field wide enough for `glyphs` characters.
    pub fn new(anchor: Point, glyphs: u32, style: FieldStyle) -> Self {
        Self {
            anchor,
            glyphs,
            style,
            value: None,
            text: heapless::String::new(),
            dirty: true,
        }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the value, returning `true` if the field needs repainting.
    pub fn set_value(&mut self, value: u32) -> bool {
        if self.value == Some(value) {
            return false;
        }
        self.value = Some(value);
        self.text.clear();
        write!(self.text, "{:02}", value).ok();
        self.dirty = true;
        true
    }
}

impl Drawable for NumericField {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds()
            .into_styled(PrimitiveStyle::with_fill(self.style.background))
            .draw(display)?;

        if self.text.is_empty() {
            return Ok(());
        }

        let character_style = MonoTextStyle::new(self.style.font, self.style.color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(&self.text, self.anchor, character_style, text_style)
            .draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        let char_size = self.style.font.character_size;
        let spacing = self.style.font.character_spacing;
        let width = self.glyphs * (char_size.width + spacing);
        let height = char_size.height;

        Rectangle::new(
            Point::new(
                self.anchor.x - width as i32,
                self.anchor.y - (height / 2) as i32,
            ),
            Size::new(width, height),
        )
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_10X20;

    fn style() -> FieldStyle {
        FieldStyle {
            font: &FONT_10X20,
            color: Rgb565::BLACK,
            background: Rgb565::WHITE,
        }
    }

    #[test]
    fn test_zero_pads() {
        let mut field = NumericField::new(Point::new(100, 50), 2, style());
        field.set_value(7);
        assert_eq!(field.text(), "07");
        field.set_value(123);
        assert_eq!(field.text(), "123");
    }

    #[test]
    fn test_unchanged_value_stays_clean() {
        let mut field = NumericField::new(Point::new(100, 50), 2, style());
        assert!(field.set_value(5));
        field.mark_clean();
        assert!(!field.set_value(5));
        assert!(!field.is_dirty());
        assert!(field.set_value(6));
        assert!(field.is_dirty());
    }

    #[test]
    fn test_bounds_end_at_anchor() {
        let field = NumericField::new(Point::new(100, 50), 2, style());
        let bounds = field.bounds();
        assert_eq!(bounds.top_left, Point::new(80, 40));
        assert_eq!(bounds.size, Size::new(20, 20));
    }
}
