//! File-transfer screen.
//!
//! The transfer server itself lives outside the core; this screen parks
//! the UI and asks the shell for tight ticks so the server stays
//! responsive while it is up.

use crate::activity::Activity;
use crate::input::{Button, ButtonStates};
use crate::renderer::{lock, SharedRenderer};
use crate::theme::{self, layout};

pub struct FileTransferActivity {
    renderer: SharedRenderer,
    on_go_home: Box<dyn Fn()>,
}

impl FileTransferActivity {
    pub fn new(renderer: SharedRenderer, on_go_home: Box<dyn Fn()>) -> Self {
        Self {
            renderer,
            on_go_home,
        }
    }
}

impl Activity for FileTransferActivity {
    fn name(&self) -> &'static str {
        "file-transfer"
    }

    fn on_enter(&mut self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "File Transfer");
        let _ = theme::draw_menu_row(fb, "Waiting for a connection...", layout::HEADER_H + 8, false);
        let _ = theme::draw_button_hints(fb, "Back: stop and go home");
        renderer.present();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        }
    }

    fn skip_tick_delay(&self) -> bool {
        true
    }
}
