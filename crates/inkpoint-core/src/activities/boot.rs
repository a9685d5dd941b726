//! Boot splash, shown while the rest of startup runs.

use crate::activity::Activity;
use crate::input::ButtonStates;
use crate::renderer::{lock, SharedRenderer};
use crate::theme;

pub struct BootActivity {
    renderer: SharedRenderer,
}

impl BootActivity {
    pub fn new(renderer: SharedRenderer) -> Self {
        Self { renderer }
    }
}

impl Activity for BootActivity {
    fn name(&self) -> &'static str {
        "boot"
    }

    fn on_enter(&mut self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "Inkpoint");
        let _ = theme::draw_popup_progress(fb, "Starting...", 50);
        renderer.present();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, _input: &ButtonStates) {}
}
