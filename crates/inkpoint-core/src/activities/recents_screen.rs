//! Full recents list, beyond the tiles that fit on the home screen.

use crate::activity::Activity;
use crate::filesystem::{lock_fs, SharedFs};
use crate::input::{Button, ButtonStates};
use crate::recents::{lock_recents, SharedRecents};
use crate::renderer::{lock, SharedRenderer};
use crate::theme::{self, layout};

pub struct RecentsActivity {
    renderer: SharedRenderer,
    store: SharedRecents,
    fs: SharedFs,
    entries: Vec<(String, String)>,
    selector: usize,
    on_open_book: Box<dyn Fn(String)>,
    on_go_home: Box<dyn Fn()>,
}

impl RecentsActivity {
    pub fn new(
        renderer: SharedRenderer,
        store: SharedRecents,
        fs: SharedFs,
        on_open_book: Box<dyn Fn(String)>,
        on_go_home: Box<dyn Fn()>,
    ) -> Self {
        Self {
            renderer,
            store,
            fs,
            entries: Vec::new(),
            selector: 0,
            on_open_book,
            on_go_home,
        }
    }

    fn redraw(&self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "Recents");
        if self.entries.is_empty() {
            let _ = theme::draw_menu_row(fb, "Nothing opened yet", layout::HEADER_H + 8, false);
        }
        for (row, (_, title)) in self.entries.iter().enumerate() {
            let _ = theme::draw_menu_row(
                fb,
                title,
                layout::HEADER_H + 8 + row as i32 * layout::MENU_ROW_H,
                row == self.selector,
            );
        }
        let _ = theme::draw_button_hints(fb, "Back  Open  Prev  Next");
        renderer.present();
    }
}

impl Activity for RecentsActivity {
    fn name(&self) -> &'static str {
        "recents"
    }

    fn on_enter(&mut self) {
        // Same lazy filtering as the home screen: missing files are
        // dropped from the view here, not from the store.
        let store = lock_recents(&self.store);
        let mut fs = lock_fs(&self.fs);
        self.entries = store
            .entries()
            .iter()
            .filter(|entry| fs.exists(&entry.path))
            .map(|entry| {
                let title = if entry.title.is_empty() {
                    crate::filesystem::basename(&entry.path).to_string()
                } else {
                    entry.title.clone()
                };
                (entry.path.clone(), title)
            })
            .collect();
        drop(fs);
        drop(store);
        self.selector = 0;
        self.redraw();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        } else if input.was_released(Button::Confirm) {
            if let Some((path, _)) = self.entries.get(self.selector) {
                (self.on_open_book)(path.clone());
            }
        } else if input.was_pressed(Button::Prev) && !self.entries.is_empty() {
            self.selector = (self.selector + self.entries.len() - 1) % self.entries.len();
            self.redraw();
        } else if input.was_pressed(Button::Next) && !self.entries.is_empty() {
            self.selector = (self.selector + 1) % self.entries.len();
            self.redraw();
        }
    }
}
