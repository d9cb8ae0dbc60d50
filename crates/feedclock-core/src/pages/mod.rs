pub mod constants;
pub mod error;
pub mod info;
pub mod page;
pub mod timer;

pub use error::ErrorPage;
pub use info::InfoPage;
pub use page::{Page, PageWrapper};
pub use timer::TimerPage;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::ui::field::{FieldStyle, NumericField};
use constants::{CLOCK_CENTER_X_PX, CLOCK_FIELD_GLYPHS, SEPARATOR_WIDTH_PX};

/// Draw one line of text centered horizontally on the screen at height `y`.
pub(crate) fn draw_centered<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    text: &str,
    y: i32,
    font: &MonoFont<'_>,
    color: Rgb565,
) -> Result<(), D::Error> {
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(
        text,
        Point::new(CLOCK_CENTER_X_PX, y),
        MonoTextStyle::new(font, color),
        text_style,
    )
    .draw(display)?;
    Ok(())
}

/// Hours and minutes fields either side of the centered ':' at height `y`.
pub(crate) fn clock_fields(y: i32, style: FieldStyle) -> [NumericField; 2] {
    let half_gap = SEPARATOR_WIDTH_PX / 2;
    let minutes_width = (CLOCK_FIELD_GLYPHS
        * (style.font.character_size.width + style.font.character_spacing))
        as i32;
    [
        NumericField::new(
            Point::new(CLOCK_CENTER_X_PX - half_gap, y),
            CLOCK_FIELD_GLYPHS,
            style,
        ),
        NumericField::new(
            Point::new(CLOCK_CENTER_X_PX + half_gap + minutes_width, y),
            CLOCK_FIELD_GLYPHS,
            style,
        ),
    ]
}
