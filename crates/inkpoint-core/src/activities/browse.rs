//! Flat file browser over the books directory.

use crate::activity::Activity;
use crate::filesystem::{has_extension, join_path, lock_fs, SharedFs};
use crate::input::{Button, ButtonStates};
use crate::renderer::{lock, SharedRenderer};
use crate::theme::{self, layout};

/// Document extensions the reader understands.
const BOOK_EXTENSIONS: [&str; 3] = [".epub", ".xtc", ".xtch"];

pub struct BrowseFilesActivity {
    renderer: SharedRenderer,
    fs: SharedFs,
    root: String,
    paths: Vec<String>,
    selector: usize,
    on_open_book: Box<dyn Fn(String)>,
    on_go_home: Box<dyn Fn()>,
}

impl BrowseFilesActivity {
    pub fn new(
        renderer: SharedRenderer,
        fs: SharedFs,
        root: impl Into<String>,
        on_open_book: Box<dyn Fn(String)>,
        on_go_home: Box<dyn Fn()>,
    ) -> Self {
        Self {
            renderer,
            fs,
            root: root.into(),
            paths: Vec::new(),
            selector: 0,
            on_open_book,
            on_go_home,
        }
    }

    fn scan(&mut self) {
        let mut fs = lock_fs(&self.fs);
        let entries = match fs.list_files(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("listing {} failed: {}", self.root, err);
                Vec::new()
            }
        };
        self.paths = entries
            .iter()
            .filter(|entry| {
                !entry.is_directory
                    && BOOK_EXTENSIONS
                        .iter()
                        .any(|ext| has_extension(&entry.name, ext))
            })
            .map(|entry| join_path(&self.root, &entry.name))
            .collect();
        self.paths.sort();
        self.selector = 0;
    }

    fn redraw(&self) {
        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "Browse Files");
        if self.paths.is_empty() {
            let _ = theme::draw_menu_row(fb, "No documents found", layout::HEADER_H + 8, false);
        }
        for (row, path) in self.paths.iter().enumerate() {
            let _ = theme::draw_menu_row(
                fb,
                crate::filesystem::basename(path),
                layout::HEADER_H + 8 + row as i32 * layout::MENU_ROW_H,
                row == self.selector,
            );
        }
        let _ = theme::draw_button_hints(fb, "Back  Open  Prev  Next");
        renderer.present();
    }
}

impl Activity for BrowseFilesActivity {
    fn name(&self) -> &'static str {
        "browse-files"
    }

    fn on_enter(&mut self) {
        self.scan();
        self.redraw();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        } else if input.was_released(Button::Confirm) {
            if let Some(path) = self.paths.get(self.selector) {
                (self.on_open_book)(path.clone());
            }
        } else if input.was_pressed(Button::Prev) && !self.paths.is_empty() {
            self.selector = (self.selector + self.paths.len() - 1) % self.paths.len();
            self.redraw();
        } else if input.was_pressed(Button::Next) && !self.paths.is_empty() {
            self.selector = (self.selector + 1) % self.paths.len();
            self.redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TestPanel;
    use crate::input::ButtonLevels;
    use crate::mock_filesystem::MockFileSystem;
    use crate::renderer::GfxRenderer;
    use std::sync::{Arc, Mutex};

    fn browse_with(fs: MockFileSystem) -> (BrowseFilesActivity, Arc<Mutex<Vec<String>>>) {
        let (panel, _probe) = TestPanel::new();
        let renderer = GfxRenderer::shared(Box::new(panel));
        let opened = Arc::new(Mutex::new(Vec::new()));
        let opened_log = Arc::clone(&opened);
        let browse = BrowseFilesActivity::new(
            renderer,
            Arc::new(Mutex::new(fs)),
            "/books",
            Box::new(move |path| opened_log.lock().unwrap().push(path)),
            Box::new(|| {}),
        );
        (browse, opened)
    }

    #[test]
    fn scan_keeps_only_book_files() {
        let mut fs = MockFileSystem::new();
        fs.add_dir("/books");
        fs.add_dir("/books/nested");
        fs.add_file("/books/b.xtc", 1);
        fs.add_file("/books/a.epub", 1);
        fs.add_file("/books/cover.bmp", 1);
        fs.add_file("/books/notes.txt", 1);

        let (mut browse, opened) = browse_with(fs);
        browse.on_enter();
        assert_eq!(browse.paths, vec!["/books/a.epub", "/books/b.xtc"]);

        let mut input = ButtonStates::new();
        input.update(ButtonLevels::only(Button::Next), 0);
        browse.tick(&input);
        input.update(ButtonLevels::released(), 10);
        browse.tick(&input);
        input.update(ButtonLevels::only(Button::Confirm), 20);
        browse.tick(&input);
        input.update(ButtonLevels::released(), 30);
        browse.tick(&input);

        browse.on_exit();
        assert_eq!(*opened.lock().unwrap(), vec!["/books/b.xtc"]);
    }

    #[test]
    fn missing_root_degrades_to_an_empty_listing() {
        let (mut browse, opened) = browse_with(MockFileSystem::new());
        browse.on_enter();
        assert!(browse.paths.is_empty());

        let mut input = ButtonStates::new();
        input.update(ButtonLevels::only(Button::Confirm), 0);
        browse.tick(&input);
        input.update(ButtonLevels::released(), 10);
        browse.tick(&input);
        assert!(opened.lock().unwrap().is_empty());
    }
}
