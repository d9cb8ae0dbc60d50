//! Timer page
//!
//! Shown while a feeding is in progress. Field 0 is hours, field 1 is
//! minutes since the feeding started.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::pages::constants::{HINT_Y_PX, TIMER_CAPTION_Y_PX, TIMER_Y_PX};
use crate::pages::{Page, clock_fields, draw_centered};
use crate::ui::colors::{TIMER_BACKGROUND, TIMER_CAPTION, TIMER_TEXT};
use crate::ui::core::{Drawable, PageId};
use crate::ui::field::{FieldStyle, NumericField};

const FIELD_STYLE: FieldStyle = FieldStyle {
    font: &FONT_10X20,
    color: TIMER_TEXT,
    background: TIMER_BACKGROUND,
};

pub struct TimerPage {
    bounds: Rectangle,
    fields: [NumericField; 2],
    dirty: bool,
}

impl TimerPage {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            fields: clock_fields(TIMER_Y_PX, FIELD_STYLE),
            dirty: true,
        }
    }

    pub fn fields(&self) -> &[NumericField] {
        &self.fields
    }
}

impl Page for TimerPage {
    fn id(&self) -> PageId {
        PageId::Timer
    }

    fn title(&self) -> &str {
        "Timer"
    }

    fn set_fields(&mut self, values: &[u32]) -> bool {
        self.fields
            .iter_mut()
            .zip(values)
            .fold(false, |changed, (field, &value)| {
                field.set_value(value) || changed
            })
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(TIMER_BACKGROUND))
            .draw(display)?;

        draw_centered(
            display,
            "Feeding",
            TIMER_CAPTION_Y_PX,
            &FONT_10X20,
            TIMER_CAPTION,
        )?;
        draw_centered(display, ":", TIMER_Y_PX, &FONT_10X20, TIMER_TEXT)?;
        draw_centered(
            display,
            "Touch when done",
            HINT_Y_PX,
            &FONT_6X10,
            TIMER_CAPTION,
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
