//! OPDS catalog screen.
//!
//! Catalog fetching is outside the core; the screen only exists as a
//! navigation target when a catalog URL is configured.

use crate::activity::Activity;
use crate::input::{Button, ButtonStates};
use crate::renderer::{lock, SharedRenderer};
use crate::theme::{self, layout};

pub struct OpdsBrowserActivity {
    renderer: SharedRenderer,
    url: String,
    on_go_home: Box<dyn Fn()>,
}

impl OpdsBrowserActivity {
    pub fn new(renderer: SharedRenderer, url: String, on_go_home: Box<dyn Fn()>) -> Self {
        Self {
            renderer,
            url,
            on_go_home,
        }
    }
}

impl Activity for OpdsBrowserActivity {
    fn name(&self) -> &'static str {
        "opds-browser"
    }

    fn on_enter(&mut self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "OPDS Browser");
        let _ = theme::draw_menu_row(fb, &self.url, layout::HEADER_H + 8, false);
        let _ = theme::draw_button_hints(fb, "Back: home");
        renderer.present();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        }
    }
}
