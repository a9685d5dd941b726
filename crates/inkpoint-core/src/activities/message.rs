//! Full-screen message, used for fatal boot errors.
//!
//! Once this is up the device is inert: no navigation, no input handling.

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
};
use embedded_text::{alignment::HorizontalAlignment, style::TextBoxStyleBuilder, TextBox};

use crate::activity::Activity;
use crate::input::ButtonStates;
use crate::renderer::{lock, SharedRenderer};
use crate::theme;

pub struct FullScreenMessageActivity {
    renderer: SharedRenderer,
    message: String,
}

impl FullScreenMessageActivity {
    pub fn new(renderer: SharedRenderer, message: impl Into<String>) -> Self {
        Self {
            renderer,
            message: message.into(),
        }
    }
}

impl Activity for FullScreenMessageActivity {
    fn name(&self) -> &'static str {
        "message"
    }

    fn on_enter(&mut self) {
        log::error!("full-screen message: {}", self.message);
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();

        let character_style = MonoTextStyle::new(theme::font_title(), BinaryColor::On);
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .build();
        let bounds = Rectangle::new(
            Point::new(theme::layout::MARGIN, crate::DISPLAY_HEIGHT as i32 / 3),
            Size::new(
                crate::DISPLAY_WIDTH - theme::layout::MARGIN as u32 * 2,
                crate::DISPLAY_HEIGHT / 3,
            ),
        );
        let _ = TextBox::with_textbox_style(&self.message, bounds, character_style, textbox_style)
            .draw(fb);
        renderer.present();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, _input: &ButtonStates) {}
}
