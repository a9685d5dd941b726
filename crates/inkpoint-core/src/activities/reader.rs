//! Reading screen shell.
//!
//! Book parsing and page layout are the reader engine's problem; this
//! activity owns the bookkeeping around an open document: promote it in
//! the recents store, remember it for boot resume, and forget it again on
//! the way out.

use crate::activity::Activity;
use crate::filesystem::{basename, file_stem, lock_fs, SharedFs};
use crate::input::{Button, ButtonStates};
use crate::recents::{lock_recents, SharedRecents};
use crate::renderer::{lock, SharedRenderer};
use crate::session_state::{lock_session, SharedSession};
use crate::theme;

use embedded_graphics::{mono_font::MonoTextStyle, pixelcolor::BinaryColor, prelude::*, text::Text};

pub struct ReaderActivity {
    renderer: SharedRenderer,
    store: SharedRecents,
    fs: SharedFs,
    session: SharedSession,
    book_path: String,
    on_go_home: Box<dyn Fn()>,
}

impl ReaderActivity {
    pub fn new(
        renderer: SharedRenderer,
        store: SharedRecents,
        fs: SharedFs,
        session: SharedSession,
        book_path: String,
        on_go_home: Box<dyn Fn()>,
    ) -> Self {
        Self {
            renderer,
            store,
            fs,
            session,
            book_path,
            on_go_home,
        }
    }

    /// Conventional sidecar cover location: `<dir>/<stem>.cover.bmp`.
    fn sidecar_cover_path(&self) -> String {
        let stem = file_stem(&self.book_path);
        match self.book_path.rfind('/') {
            Some(slash) => format!("{}/{}.cover.bmp", &self.book_path[..slash], stem),
            None => format!("{}.cover.bmp", stem),
        }
    }
}

impl Activity for ReaderActivity {
    fn name(&self) -> &'static str {
        "reader"
    }

    fn on_enter(&mut self) {
        let title = file_stem(&self.book_path).to_string();
        let cover = {
            let mut fs = lock_fs(&self.fs);
            let sidecar = self.sidecar_cover_path();
            if fs.exists(&sidecar) {
                sidecar
            } else {
                String::new()
            }
        };
        {
            let mut store = lock_recents(&self.store);
            store.add_or_promote(&self.book_path, &title, "", &cover);
            if !store.persist() {
                log::warn!("recents not persisted; promotion is in memory only");
            }
        }
        if !lock_session(&self.session).set_open_book(&self.book_path) {
            log::warn!("session state not persisted; resume will not survive reboot");
        }

        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "Reading");
        let style = MonoTextStyle::new(theme::font_body(), BinaryColor::On);
        let _ = Text::new(
            basename(&self.book_path),
            Point::new(theme::layout::MARGIN, theme::layout::HEADER_H + 40),
            style,
        )
        .draw(fb);
        let _ = theme::draw_button_hints(fb, "Back: home");
        renderer.present();
    }

    fn on_exit(&mut self) {
        lock_session(&self.session).clear_open_book();
    }

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        }
    }
}
