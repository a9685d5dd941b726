//! Shared layout metrics and drawing helpers.
//!
//! Every screen draws through these instead of hardcoding offsets, so a
//! metrics change lands everywhere at once. Black-on-white only; no
//! animation, high contrast for e-ink.

use embedded_graphics::{
    mono_font::{ascii, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

/// Layout constants for the 480x800 portrait panel.
pub mod layout {
    /// Side margin from the screen edge.
    pub const MARGIN: i32 = 20;
    /// Header band height, including the rule line.
    pub const HEADER_H: i32 = 48;
    /// Height of the continue-reading cover tile on the home screen.
    pub const COVER_TILE_H: i32 = 280;
    /// Height of one menu row.
    pub const MENU_ROW_H: i32 = 48;
    /// Button-hint band height at the bottom edge.
    pub const HINTS_H: i32 = 36;
    /// Progress popup size.
    pub const POPUP_W: u32 = 300;
    pub const POPUP_H: u32 = 88;
}

/// Title font, for headers and selected tiles.
pub fn font_title() -> &'static MonoFont<'static> {
    &ascii::FONT_10X20
}

/// Body font, for menu rows and content.
pub fn font_body() -> &'static MonoFont<'static> {
    &ascii::FONT_9X15
}

/// Small font, for hints and metadata.
pub fn font_small() -> &'static MonoFont<'static> {
    &ascii::FONT_6X10
}

/// Header band: title plus a rule line across the screen.
pub fn draw_header<D: DrawTarget<Color = BinaryColor>>(
    display: &mut D,
    title: &str,
) -> Result<(), D::Error> {
    let width = display.bounding_box().size.width;
    let style = MonoTextStyle::new(font_title(), BinaryColor::On);
    Text::new(title, Point::new(layout::MARGIN, 30), style).draw(display)?;
    Rectangle::new(
        Point::new(0, layout::HEADER_H - 2),
        Size::new(width, 2),
    )
    .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
    .draw(display)?;
    Ok(())
}

/// One selectable menu row; selected rows render inverted.
pub fn draw_menu_row<D: DrawTarget<Color = BinaryColor>>(
    display: &mut D,
    label: &str,
    y: i32,
    selected: bool,
) -> Result<(), D::Error> {
    let width = display.bounding_box().size.width;
    if selected {
        Rectangle::new(
            Point::new(layout::MARGIN - 4, y),
            Size::new(width - (layout::MARGIN as u32 * 2) + 8, layout::MENU_ROW_H as u32 - 6),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(display)?;
    }
    let color = if selected {
        BinaryColor::Off
    } else {
        BinaryColor::On
    };
    let style = MonoTextStyle::new(font_body(), color);
    Text::new(label, Point::new(layout::MARGIN + 4, y + 30), style).draw(display)?;
    Ok(())
}

/// Bottom hint band naming the button roles.
pub fn draw_button_hints<D: DrawTarget<Color = BinaryColor>>(
    display: &mut D,
    hints: &str,
) -> Result<(), D::Error> {
    let size = display.bounding_box().size;
    let y = size.height as i32 - layout::HINTS_H;
    Rectangle::new(Point::new(0, y), Size::new(size.width, 1))
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(display)?;
    let style = MonoTextStyle::new(font_small(), BinaryColor::On);
    Text::new(hints, Point::new(layout::MARGIN, y + 22), style).draw(display)?;
    Ok(())
}

/// Centered popup with a label and a 0-100 progress bar.
pub fn draw_popup_progress<D: DrawTarget<Color = BinaryColor>>(
    display: &mut D,
    label: &str,
    percent: u32,
) -> Result<(), D::Error> {
    let size = display.bounding_box().size;
    let x = (size.width as i32 - layout::POPUP_W as i32) / 2;
    let y = (size.height as i32 - layout::POPUP_H as i32) / 2;

    Rectangle::new(Point::new(x, y), Size::new(layout::POPUP_W, layout::POPUP_H))
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(display)?;
    Rectangle::new(Point::new(x, y), Size::new(layout::POPUP_W, layout::POPUP_H))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
        .draw(display)?;

    let style = MonoTextStyle::new(font_body(), BinaryColor::On);
    Text::new(label, Point::new(x + 16, y + 30), style).draw(display)?;

    let bar_w = layout::POPUP_W - 32;
    Rectangle::new(Point::new(x + 16, y + 48), Size::new(bar_w, 16))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display)?;
    let fill = bar_w * percent.min(100) / 100;
    if fill > 0 {
        Rectangle::new(Point::new(x + 16, y + 48), Size::new(fill, 16))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;
    }
    Ok(())
}
