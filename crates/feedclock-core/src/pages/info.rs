//! Info page
//!
//! Resting screen: hours and minutes since the last feeding ended, and how
//! many feedings were completed today. Fields by index:
//!
//! | Index | Field              |
//! |-------|--------------------|
//! | 0     | hours since feed   |
//! | 1     | minutes since feed |
//! | 2     | feedings today     |

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::pages::constants::*;
use crate::pages::{Page, clock_fields, draw_centered};
use crate::ui::colors::{INFO_BACKGROUND, INFO_CAPTION, INFO_TEXT};
use crate::ui::core::{Drawable, PageId};
use crate::ui::field::{FieldStyle, NumericField};

const FIELD_STYLE: FieldStyle = FieldStyle {
    font: &FONT_10X20,
    color: INFO_TEXT,
    background: INFO_BACKGROUND,
};

pub struct InfoPage {
    bounds: Rectangle,
    fields: [NumericField; 3],
    dirty: bool,
}

impl InfoPage {
    pub fn new(bounds: Rectangle) -> Self {
        let [hours, minutes] = clock_fields(INFO_SINCE_Y_PX, FIELD_STYLE);
        let count_width = (COUNT_FIELD_GLYPHS
            * (FONT_10X20.character_size.width + FONT_10X20.character_spacing))
            as i32;
        let count = NumericField::new(
            Point::new(CLOCK_CENTER_X_PX + count_width / 2, INFO_COUNT_Y_PX),
            COUNT_FIELD_GLYPHS,
            FIELD_STYLE,
        );

        Self {
            bounds,
            fields: [hours, minutes, count],
            dirty: true,
        }
    }

    pub fn fields(&self) -> &[NumericField] {
        &self.fields
    }
}

impl Page for InfoPage {
    fn id(&self) -> PageId {
        PageId::Info
    }

    fn title(&self) -> &str {
        "Info"
    }

    fn set_fields(&mut self, values: &[u32]) -> bool {
        let mut changed = false;
        for (field, &value) in self.fields.iter_mut().zip(values) {
            changed |= field.set_value(value);
        }
        changed
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(INFO_BACKGROUND))
            .draw(display)?;

        draw_centered(
            display,
            "Since last feed",
            INFO_SINCE_CAPTION_Y_PX,
            &FONT_10X20,
            INFO_CAPTION,
        )?;
        draw_centered(display, ":", INFO_SINCE_Y_PX, &FONT_10X20, INFO_TEXT)?;
        draw_centered(
            display,
            "Feeds today",
            INFO_COUNT_CAPTION_Y_PX,
            &FONT_10X20,
            INFO_CAPTION,
        )?;
        draw_centered(
            display,
            "Touch to start feeding",
            HINT_Y_PX,
            &FONT_6X10,
            INFO_CAPTION,
        )?;

        for field in self.fields.iter_mut() {
            field.draw(display)?;
            field.mark_clean();
        }
        self.dirty = false;
        Ok(())
    }

    fn draw_changes<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        for field in self.fields.iter_mut().filter(|f| f.is_dirty()) {
            field.draw(display)?;
            field.mark_clean();
        }
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.fields.iter().any(|f| f.is_dirty())
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.fields.iter_mut().for_each(|f| f.mark_clean());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(320, 240))
    }

    #[test]
    fn test_fields_do_not_overlap() {
        let page = InfoPage::new(screen());
        let [hours, minutes, count] = [
            page.fields()[0].bounds(),
            page.fields()[1].bounds(),
            page.fields()[2].bounds(),
        ];
        assert!(hours.intersection(&minutes).is_zero_sized());
        assert!(hours.intersection(&count).is_zero_sized());
        assert!(hours.bottom_right().unwrap().x < 160);
        assert!(minutes.top_left.x > 160);
    }

    #[test]
    fn test_set_fields_reports_changes() {
        let mut page = InfoPage::new(screen());
        assert!(page.set_fields(&[1, 2, 3]));
        page.mark_clean();
        assert!(!page.set_fields(&[1, 2, 3]));
        assert!(!page.is_dirty());
        assert!(page.set_fields(&[1, 3, 3]));
        assert_eq!(page.fields()[1].text(), "03");
        assert!(!page.fields()[0].is_dirty());
        assert!(page.fields()[1].is_dirty());
    }
}
