//! Screen left on the panel through deep sleep.

use crate::activity::Activity;
use crate::input::ButtonStates;
use crate::renderer::{lock, SharedRenderer};
use crate::theme;

use embedded_graphics::{mono_font::MonoTextStyle, pixelcolor::BinaryColor, prelude::*, text::Text};

pub struct SleepActivity {
    renderer: SharedRenderer,
}

impl SleepActivity {
    pub fn new(renderer: SharedRenderer) -> Self {
        Self { renderer }
    }
}

impl Activity for SleepActivity {
    fn name(&self) -> &'static str {
        "sleep"
    }

    fn on_enter(&mut self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let style = MonoTextStyle::new(theme::font_title(), BinaryColor::On);
        let _ = Text::new(
            "Sleeping",
            Point::new(
                theme::layout::MARGIN,
                crate::DISPLAY_HEIGHT as i32 / 2,
            ),
            style,
        )
        .draw(fb);
        let small = MonoTextStyle::new(theme::font_small(), BinaryColor::On);
        let _ = Text::new(
            "Hold the power button to wake",
            Point::new(
                theme::layout::MARGIN,
                crate::DISPLAY_HEIGHT as i32 / 2 + 32,
            ),
            small,
        )
        .draw(fb);
        renderer.present();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, _input: &ButtonStates) {}
}
