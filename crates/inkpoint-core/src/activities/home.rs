//! Home screen: continue-reading tile, recent-document rows, fixed menu.
//!
//! The only screen with its own render task. The tick path mutates the
//! shared view and marks the dirty flag; the render task repaints from the
//! view, caches the expensive cover region as a frame-buffer snapshot, and
//! runs the one-shot cover-thumbnail pass after the first paint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::activity::Activity;
use crate::covers::{lock_covers, SharedCovers};
use crate::filesystem::{lock_fs, SharedFs};
use crate::input::{Button, ButtonStates};
use crate::recents::{lock_recents, RecentEntry, SharedRecents};
use crate::render_task::{RenderSignals, RenderTask};
use crate::renderer::{GfxRenderer, SharedRenderer};
use crate::theme::{self, layout};

/// Navigation callbacks supplied by the shell at construction. The home
/// screen never names another activity's type.
pub struct HomeCallbacks {
    pub open_book: Box<dyn Fn(String)>,
    pub browse_files: Box<dyn Fn()>,
    pub recents: Box<dyn Fn()>,
    pub opds_browser: Box<dyn Fn()>,
    pub file_transfer: Box<dyn Fn()>,
    pub settings: Box<dyn Fn()>,
}

const FIXED_LABELS: [&str; 4] = ["Browse Files", "Recents", "File Transfer", "Settings"];

/// What a confirmed selection resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MenuTarget {
    RecentBook(usize),
    BrowseFiles,
    RecentsList,
    OpdsBrowser,
    FileTransfer,
    Settings,
}

/// Menu geometry derived from the *current* recents list and OPDS flag.
/// Never cached across ticks: the optional entry shifts every fixed
/// offset after it, so both navigation and confirm must agree on one
/// freshly computed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MenuLayout {
    pub recents: usize,
    pub has_opds: bool,
}

impl MenuLayout {
    pub fn item_count(&self) -> usize {
        self.recents + FIXED_LABELS.len() + usize::from(self.has_opds)
    }

    /// Fixed-entry labels in display order, OPDS spliced in after Recents.
    pub fn fixed_labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = FIXED_LABELS.to_vec();
        if self.has_opds {
            labels.insert(2, "OPDS Browser");
        }
        labels
    }

    pub fn resolve(&self, selector: usize) -> Option<MenuTarget> {
        if selector < self.recents {
            return Some(MenuTarget::RecentBook(selector));
        }
        let fixed = selector - self.recents;
        let mut idx = 0;
        let browse_idx = idx;
        idx += 1;
        let recents_idx = idx;
        idx += 1;
        let opds_idx = if self.has_opds {
            let value = idx;
            idx += 1;
            Some(value)
        } else {
            None
        };
        let transfer_idx = idx;
        let settings_idx = idx + 1;

        if fixed == browse_idx {
            Some(MenuTarget::BrowseFiles)
        } else if fixed == recents_idx {
            Some(MenuTarget::RecentsList)
        } else if Some(fixed) == opds_idx {
            Some(MenuTarget::OpdsBrowser)
        } else if fixed == transfer_idx {
            Some(MenuTarget::FileTransfer)
        } else if fixed == settings_idx {
            Some(MenuTarget::Settings)
        } else {
            None
        }
    }
}

/// State shared between the tick path and the render task.
struct HomeView {
    selector: usize,
    recents: Vec<RecentEntry>,
    has_opds: bool,
    /// Captured raster of the header + cover tile, restored on later
    /// draws instead of recomputing. Invalidated when the recents list
    /// changes; freed on exit.
    cover_snapshot: Option<Vec<u8>>,
}

struct HomeShared {
    view: Mutex<HomeView>,
    first_render_done: AtomicBool,
    covers_loaded: AtomicBool,
}

fn lock_view(shared: &HomeShared) -> MutexGuard<'_, HomeView> {
    match shared.view.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct HomeActivity {
    renderer: SharedRenderer,
    store: SharedRecents,
    fs: SharedFs,
    covers: SharedCovers,
    callbacks: HomeCallbacks,
    recent_max: usize,
    cover_height: u32,
    opds_url: String,
    shared: Arc<HomeShared>,
    signals: Arc<RenderSignals>,
    task: Option<RenderTask>,
}

impl HomeActivity {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        renderer: SharedRenderer,
        store: SharedRecents,
        fs: SharedFs,
        covers: SharedCovers,
        callbacks: HomeCallbacks,
        recent_max: usize,
        cover_height: u32,
        opds_url: String,
    ) -> Self {
        Self {
            renderer,
            store,
            fs,
            covers,
            callbacks,
            recent_max,
            cover_height,
            opds_url,
            shared: Arc::new(HomeShared {
                view: Mutex::new(HomeView {
                    selector: 0,
                    recents: Vec::new(),
                    has_opds: false,
                    cover_snapshot: None,
                }),
                first_render_done: AtomicBool::new(false),
                covers_loaded: AtomicBool::new(false),
            }),
            signals: RenderSignals::new(),
            task: None,
        }
    }

    /// Copy up to `recent_max` store entries whose backing file still
    /// exists. Checked once here, not re-verified per frame.
    fn hydrate_recents(&self) -> Vec<RecentEntry> {
        let store = lock_recents(&self.store);
        let mut fs = lock_fs(&self.fs);
        let mut recents = Vec::with_capacity(self.recent_max);
        for entry in store.entries() {
            if recents.len() >= self.recent_max {
                break;
            }
            if !fs.exists(&entry.path) {
                log::info!("recent entry gone from storage: {}", entry.path);
                continue;
            }
            recents.push(entry.clone());
        }
        recents
    }

    fn layout_now(&self) -> MenuLayout {
        let view = lock_view(&self.shared);
        MenuLayout {
            recents: view.recents.len(),
            has_opds: view.has_opds,
        }
    }

    #[cfg(test)]
    fn selector(&self) -> usize {
        lock_view(&self.shared).selector
    }
}

impl Activity for HomeActivity {
    fn name(&self) -> &'static str {
        "home"
    }

    fn on_enter(&mut self) {
        let recents = self.hydrate_recents();
        {
            let mut view = lock_view(&self.shared);
            view.selector = 0;
            view.has_opds = !self.opds_url.is_empty();
            view.recents = recents;
            view.cover_snapshot = None;
        }
        self.shared.first_render_done.store(false, Ordering::SeqCst);
        self.shared.covers_loaded.store(false, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let store = Arc::clone(&self.store);
        let covers = Arc::clone(&self.covers);
        let signals = Arc::clone(&self.signals);
        let cover_height = self.cover_height;
        self.signals.mark_dirty();
        self.task = Some(RenderTask::spawn(
            Arc::clone(&self.renderer),
            Arc::clone(&self.signals),
            move |renderer: &mut GfxRenderer| {
                draw_home(renderer, &shared);
                if !shared.first_render_done.swap(true, Ordering::SeqCst) {
                    // First paint goes out before any cover work; queue an
                    // immediate second pass.
                    signals.mark_dirty();
                } else if !shared.covers_loaded.swap(true, Ordering::SeqCst) {
                    run_cover_pass(renderer, &shared, &store, &covers, cover_height, &signals);
                }
            },
        ));
    }

    fn on_exit(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.halt();
        }
        lock_view(&self.shared).cover_snapshot = None;
    }

    fn tick(&mut self, input: &ButtonStates) {
        let menu = self.layout_now();
        let count = menu.item_count();

        if input.was_released(Button::Confirm) {
            let target = {
                let view = lock_view(&self.shared);
                match menu.resolve(view.selector) {
                    Some(MenuTarget::RecentBook(index)) => view
                        .recents
                        .get(index)
                        .map(|entry| MenuTargetResolved::Book(entry.path.clone())),
                    Some(MenuTarget::BrowseFiles) => Some(MenuTargetResolved::BrowseFiles),
                    Some(MenuTarget::RecentsList) => Some(MenuTargetResolved::RecentsList),
                    Some(MenuTarget::OpdsBrowser) => Some(MenuTargetResolved::OpdsBrowser),
                    Some(MenuTarget::FileTransfer) => Some(MenuTargetResolved::FileTransfer),
                    Some(MenuTarget::Settings) => Some(MenuTargetResolved::Settings),
                    None => None,
                }
            };
            // Callbacks run outside the view lock; they enqueue navigation.
            match target {
                Some(MenuTargetResolved::Book(path)) => (self.callbacks.open_book)(path),
                Some(MenuTargetResolved::BrowseFiles) => (self.callbacks.browse_files)(),
                Some(MenuTargetResolved::RecentsList) => (self.callbacks.recents)(),
                Some(MenuTargetResolved::OpdsBrowser) => (self.callbacks.opds_browser)(),
                Some(MenuTargetResolved::FileTransfer) => (self.callbacks.file_transfer)(),
                Some(MenuTargetResolved::Settings) => (self.callbacks.settings)(),
                None => {}
            }
        } else if input.was_pressed(Button::Prev) {
            let mut view = lock_view(&self.shared);
            view.selector = (view.selector + count - 1) % count;
            drop(view);
            self.signals.mark_dirty();
        } else if input.was_pressed(Button::Next) {
            let mut view = lock_view(&self.shared);
            view.selector = (view.selector + 1) % count;
            drop(view);
            self.signals.mark_dirty();
        }
    }
}

enum MenuTargetResolved {
    Book(String),
    BrowseFiles,
    RecentsList,
    OpdsBrowser,
    FileTransfer,
    Settings,
}

fn draw_home(renderer: &mut GfxRenderer, shared: &HomeShared) {
    // Copy the view under a short lock; the tick path must never wait out
    // a slow present.
    let (selector, recents, has_opds, snapshot) = {
        let view = lock_view(shared);
        (
            view.selector,
            view.recents.clone(),
            view.has_opds,
            view.cover_snapshot.clone(),
        )
    };
    let menu = MenuLayout {
        recents: recents.len(),
        has_opds,
    };

    let fb = renderer.framebuffer();
    let restored = snapshot
        .as_ref()
        .map(|snap| fb.restore(snap))
        .unwrap_or(false);
    if !restored {
        fb.clear();
        let _ = theme::draw_header(fb, "Home");
        draw_cover_tile(fb, recents.first());
        lock_view(shared).cover_snapshot = Some(fb.snapshot());
    }

    let menu_top = layout::HEADER_H + layout::COVER_TILE_H + 8;
    let mut row = 0;
    for entry in &recents {
        let label = if entry.title.is_empty() {
            crate::filesystem::basename(&entry.path)
        } else {
            entry.title.as_str()
        };
        let _ = theme::draw_menu_row(
            fb,
            label,
            menu_top + row as i32 * layout::MENU_ROW_H,
            selector == row,
        );
        row += 1;
    }
    for label in menu.fixed_labels() {
        let _ = theme::draw_menu_row(
            fb,
            label,
            menu_top + row as i32 * layout::MENU_ROW_H,
            selector == row,
        );
        row += 1;
    }
    let _ = theme::draw_button_hints(fb, "Back  Select  Prev  Next");

    renderer.present();
}

/// Continue-reading card for the most recent document.
fn draw_cover_tile(
    fb: &mut crate::framebuffer::FrameBuffer,
    entry: Option<&RecentEntry>,
) {
    use embedded_graphics::{
        mono_font::MonoTextStyle,
        pixelcolor::BinaryColor,
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
        text::Text,
    };

    let top = layout::HEADER_H + 8;
    let width = crate::DISPLAY_WIDTH;
    let _ = Rectangle::new(
        Point::new(layout::MARGIN, top),
        Size::new(
            width - layout::MARGIN as u32 * 2,
            (layout::COVER_TILE_H - 16) as u32,
        ),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
    .draw(fb);

    let body = MonoTextStyle::new(theme::font_body(), BinaryColor::On);
    let small = MonoTextStyle::new(theme::font_small(), BinaryColor::On);
    match entry {
        Some(entry) => {
            let title = if entry.title.is_empty() {
                crate::filesystem::basename(&entry.path)
            } else {
                entry.title.as_str()
            };
            let _ = Text::new("Continue Reading", Point::new(layout::MARGIN + 16, top + 36), small)
                .draw(fb);
            let _ = Text::new(title, Point::new(layout::MARGIN + 16, top + 70), body).draw(fb);
            if !entry.author.is_empty() {
                let _ = Text::new(
                    &entry.author,
                    Point::new(layout::MARGIN + 16, top + 96),
                    small,
                )
                .draw(fb);
            }
        }
        None => {
            let _ = Text::new(
                "No recent documents",
                Point::new(layout::MARGIN + 16, top + 70),
                body,
            )
            .draw(fb);
        }
    }
}

/// One-shot thumbnail pass, run on the render task after the first paint.
/// A failure clears that entry's thumbnail reference (store and view) and
/// moves on; the batch never aborts.
fn run_cover_pass(
    renderer: &mut GfxRenderer,
    shared: &HomeShared,
    store: &SharedRecents,
    covers: &SharedCovers,
    cover_height: u32,
    signals: &RenderSignals,
) {
    let entries: Vec<RecentEntry> = lock_view(shared).recents.clone();
    let total = entries
        .iter()
        .filter(|entry| !entry.cover_path.is_empty())
        .count();
    if total == 0 {
        return;
    }

    log::info!("generating cover thumbnails for {} entries", total);
    let mut done = 0usize;
    for entry in &entries {
        if entry.cover_path.is_empty() {
            continue;
        }
        let percent = (10 + done * 90 / total) as u32;
        let _ = theme::draw_popup_progress(renderer.framebuffer(), "Loading covers...", percent);
        renderer.present();
        done += 1;

        let result = lock_covers(covers).ensure_thumbnail(&entry.cover_path, cover_height);
        if let Err(err) = result {
            log::warn!("cover thumbnail failed for {}: {}", entry.path, err);
            {
                let mut store = lock_recents(store);
                store.update(&entry.path, &entry.title, &entry.author, "");
                store.persist();
            }
            let mut view = lock_view(shared);
            if let Some(live) = view.recents.iter_mut().find(|e| e.path == entry.path) {
                live.cover_path.clear();
            }
        }
    }

    // Recapture the cover region now that thumbnails settled, and repaint
    // without the popup.
    lock_view(shared).cover_snapshot = None;
    signals.mark_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covers::ScriptedCovers;
    use crate::display::TestPanel;
    use crate::input::{ButtonLevels, ButtonStates};
    use crate::mock_filesystem::MockFileSystem;
    use crate::recents::RecentEntriesStore;
    use proptest::prelude::*;

    fn layout_of(recents: usize, has_opds: bool) -> MenuLayout {
        MenuLayout { recents, has_opds }
    }

    #[test]
    fn item_count_matches_fixed_plus_recent_entries() {
        assert_eq!(layout_of(2, false).item_count(), 6);
        assert_eq!(layout_of(2, true).item_count(), 7);
        assert_eq!(layout_of(0, false).item_count(), 4);
    }

    #[test]
    fn settings_shifts_by_exactly_one_when_opds_appears() {
        let without = layout_of(2, false);
        let with = layout_of(2, true);

        let settings_without = (0..without.item_count())
            .find(|i| without.resolve(*i) == Some(MenuTarget::Settings))
            .unwrap();
        let settings_with = (0..with.item_count())
            .find(|i| with.resolve(*i) == Some(MenuTarget::Settings))
            .unwrap();
        assert_eq!(settings_with, settings_without + 1);
    }

    #[test]
    fn resolution_covers_every_slot_exactly_once() {
        for has_opds in [false, true] {
            let menu = layout_of(3, has_opds);
            let mut targets = Vec::new();
            for selector in 0..menu.item_count() {
                targets.push(menu.resolve(selector).unwrap());
            }
            // Recents first, then the fixed block ending in Settings.
            assert_eq!(targets[0], MenuTarget::RecentBook(0));
            assert_eq!(targets[3], MenuTarget::BrowseFiles);
            assert_eq!(*targets.last().unwrap(), MenuTarget::Settings);
            assert_eq!(
                targets.contains(&MenuTarget::OpdsBrowser),
                has_opds,
            );
            assert!(menu.resolve(menu.item_count()).is_none());
        }
    }

    proptest! {
        #[test]
        fn opds_presence_splices_exactly_one_entry(recents in 0usize..6) {
            let without = layout_of(recents, false);
            let with = layout_of(recents, true);
            prop_assert_eq!(with.item_count(), without.item_count() + 1);

            // The menu with OPDS is the menu without it, plus one entry
            // after Recents; every other logical target keeps its place.
            let mut expected: Vec<_> = (0..without.item_count())
                .map(|s| without.resolve(s).unwrap())
                .collect();
            expected.insert(recents + 2, MenuTarget::OpdsBrowser);
            let got: Vec<_> = (0..with.item_count())
                .map(|s| with.resolve(s).unwrap())
                .collect();
            prop_assert_eq!(got, expected);
        }
    }

    struct HomeFixture {
        home: HomeActivity,
        opened: Arc<Mutex<Vec<String>>>,
        nav: Arc<Mutex<Vec<&'static str>>>,
    }

    fn fixture(store: RecentEntriesStore, fs: MockFileSystem, opds_url: &str) -> HomeFixture {
        let (panel, _probe) = TestPanel::new();
        let renderer = GfxRenderer::shared(Box::new(panel));
        let store: SharedRecents = Arc::new(Mutex::new(store));
        let fs: SharedFs = Arc::new(Mutex::new(fs));
        let covers: SharedCovers = Arc::new(Mutex::new(ScriptedCovers::new()));

        let opened = Arc::new(Mutex::new(Vec::new()));
        let nav: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let record = |label: &'static str, nav: &Arc<Mutex<Vec<&'static str>>>| {
            let nav = Arc::clone(nav);
            Box::new(move || nav.lock().unwrap().push(label)) as Box<dyn Fn()>
        };
        let opened_log = Arc::clone(&opened);
        let callbacks = HomeCallbacks {
            open_book: Box::new(move |path| opened_log.lock().unwrap().push(path)),
            browse_files: record("browse", &nav),
            recents: record("recents", &nav),
            opds_browser: record("opds", &nav),
            file_transfer: record("transfer", &nav),
            settings: record("settings", &nav),
        };

        HomeFixture {
            home: HomeActivity::new(
                renderer,
                store,
                fs,
                covers,
                callbacks,
                3,
                240,
                opds_url.to_string(),
            ),
            opened,
            nav,
        }
    }

    fn press(home: &mut HomeActivity, button: Button, at_ms: &mut u64) {
        let mut input = ButtonStates::new();
        input.update(ButtonLevels::only(button), *at_ms);
        home.tick(&input);
        *at_ms += 10;
        input.update(ButtonLevels::released(), *at_ms);
        home.tick(&input);
        *at_ms += 10;
    }

    #[test]
    fn navigation_wraps_modulo_item_count() {
        let mut fixture = fixture(RecentEntriesStore::new(3), MockFileSystem::new(), "");
        fixture.home.on_enter();
        let count = fixture.home.layout_now().item_count();
        assert_eq!(count, 4);

        let mut at = 0;
        for n in 1..=9usize {
            press(&mut fixture.home, Button::Next, &mut at);
            assert_eq!(fixture.home.selector(), n % count);
        }
        fixture.home.on_exit();

        fixture.home.on_enter();
        let mut at = 0;
        for n in 1..=5usize {
            press(&mut fixture.home, Button::Prev, &mut at);
            assert_eq!(fixture.home.selector(), (count * n - n) % count);
        }
        fixture.home.on_exit();
    }

    #[test]
    fn hydration_drops_entries_whose_file_is_gone() {
        let mut store = RecentEntriesStore::new(5);
        store.add_or_promote("/books/c.epub", "C", "", "");
        store.add_or_promote("/books/b.epub", "B", "", "");
        store.add_or_promote("/books/a.epub", "A", "", "");

        let mut fs = MockFileSystem::new();
        fs.add_dir("/books");
        fs.add_file("/books/a.epub", 1);
        fs.add_file("/books/c.epub", 1);

        let mut fixture = fixture(store, fs, "");
        fixture.home.on_enter();
        let menu = fixture.home.layout_now();
        assert_eq!(menu.recents, 2);
        {
            let view = lock_view(&fixture.home.shared);
            let paths: Vec<_> = view.recents.iter().map(|e| e.path.clone()).collect();
            assert_eq!(paths, vec!["/books/a.epub", "/books/c.epub"]);
        }
        fixture.home.on_exit();
    }

    #[test]
    fn confirm_resolves_the_same_logical_target_with_and_without_opds() {
        for (opds_url, expected) in [
            ("", vec!["browse", "recents", "transfer", "settings"]),
            (
                "http://catalog/opds",
                vec!["browse", "recents", "opds", "transfer", "settings"],
            ),
        ] {
            let mut fixture = fixture(RecentEntriesStore::new(3), MockFileSystem::new(), opds_url);
            fixture.home.on_enter();
            let mut at = 0;
            for _ in 0..expected.len() {
                press(&mut fixture.home, Button::Confirm, &mut at);
                press(&mut fixture.home, Button::Next, &mut at);
            }
            fixture.home.on_exit();
            assert_eq!(*fixture.nav.lock().unwrap(), expected);
            assert!(fixture.opened.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn navigation_and_confirm_agree_when_the_optional_entry_flips_mid_session() {
        let mut fixture = fixture(RecentEntriesStore::new(3), MockFileSystem::new(), "");
        fixture.home.on_enter();
        assert_eq!(fixture.home.layout_now().item_count(), 4);

        // Walk to the last entry, then grow the menu under the selector.
        let mut at = 0;
        for _ in 0..3 {
            press(&mut fixture.home, Button::Next, &mut at);
        }
        assert_eq!(fixture.home.selector(), 3);
        lock_view(&fixture.home.shared).has_opds = true;

        // Navigation and confirm both see the five-item layout: the next
        // step lands on the shifted Settings slot instead of wrapping.
        assert_eq!(fixture.home.layout_now().item_count(), 5);
        press(&mut fixture.home, Button::Next, &mut at);
        assert_eq!(fixture.home.selector(), 4);
        press(&mut fixture.home, Button::Confirm, &mut at);
        fixture.home.on_exit();
        assert_eq!(*fixture.nav.lock().unwrap(), vec!["settings"]);
    }

    #[test]
    fn confirm_on_a_recent_tile_opens_that_document() {
        let mut store = RecentEntriesStore::new(3);
        store.add_or_promote("/books/b.epub", "B", "", "");
        store.add_or_promote("/books/a.epub", "A", "", "");
        let mut fs = MockFileSystem::new();
        fs.add_dir("/books");
        fs.add_file("/books/a.epub", 1);
        fs.add_file("/books/b.epub", 1);

        let mut fixture = fixture(store, fs, "");
        fixture.home.on_enter();
        let mut at = 0;
        press(&mut fixture.home, Button::Next, &mut at);
        press(&mut fixture.home, Button::Confirm, &mut at);
        fixture.home.on_exit();

        assert_eq!(*fixture.opened.lock().unwrap(), vec!["/books/b.epub"]);
        assert!(fixture.nav.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_cover_generation_clears_the_reference_but_keeps_the_entry() {
        let mut store = RecentEntriesStore::new(3);
        store.add_or_promote("/books/a.epub", "A", "Author", "/covers/a.bmp");
        let store: SharedRecents = Arc::new(Mutex::new(store));

        let mut scripted = ScriptedCovers::new();
        scripted.fail_for("/covers/a.bmp");
        let scripted = Arc::new(Mutex::new(scripted));
        let covers: SharedCovers = scripted.clone();

        let (panel, probe) = TestPanel::new();
        let renderer = GfxRenderer::shared(Box::new(panel));
        let shared = HomeShared {
            view: Mutex::new(HomeView {
                selector: 0,
                recents: lock_recents(&store).entries().to_vec(),
                has_opds: false,
                cover_snapshot: None,
            }),
            first_render_done: AtomicBool::new(true),
            covers_loaded: AtomicBool::new(true),
        };
        let signals = RenderSignals::new();

        {
            let mut renderer = crate::renderer::lock(&renderer);
            run_cover_pass(&mut renderer, &shared, &store, &covers, 240, &signals);
        }

        // Progress popup hit the panel at least once.
        assert!(probe.presents_completed() >= 1);
        let store = lock_recents(&store);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].cover_path, "");
        assert_eq!(lock_view(&shared).recents[0].cover_path, "");
        // Next draw recomputes the cover region and repaints.
        assert!(lock_view(&shared).cover_snapshot.is_none());
        assert!(signals.take_dirty());
        // The provider saw exactly one request, at the configured height.
        assert_eq!(
            scripted.lock().unwrap().requests(),
            &[("/covers/a.bmp".to_string(), 240)]
        );
    }

    #[test]
    fn render_task_paints_and_exit_waits_for_it() {
        let mut store = RecentEntriesStore::new(3);
        store.add_or_promote("/books/a.epub", "A", "Author", "");
        let mut fs = MockFileSystem::new();
        fs.add_dir("/books");
        fs.add_file("/books/a.epub", 1);

        let (panel, probe) = TestPanel::new();
        let renderer = GfxRenderer::shared(Box::new(panel));
        let store: SharedRecents = Arc::new(Mutex::new(store));
        let fs: SharedFs = Arc::new(Mutex::new(fs));
        let covers: SharedCovers = Arc::new(Mutex::new(ScriptedCovers::new()));
        let callbacks = HomeCallbacks {
            open_book: Box::new(|_| {}),
            browse_files: Box::new(|| {}),
            recents: Box::new(|| {}),
            opds_browser: Box::new(|| {}),
            file_transfer: Box::new(|| {}),
            settings: Box::new(|| {}),
        };
        let mut home =
            HomeActivity::new(renderer, store, fs, covers, callbacks, 3, 240, String::new());

        home.on_enter();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while probe.presents_completed() < 2 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        // First paint plus the queued second pass.
        assert!(probe.presents_completed() >= 2);
        home.on_exit();
        assert_eq!(probe.presents_started(), probe.presents_completed());
        assert!(lock_view(&home.shared).cover_snapshot.is_none());
    }
}
