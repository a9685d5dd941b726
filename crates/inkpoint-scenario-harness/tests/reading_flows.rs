//! Recents persistence, boot resume, and the cover-thumbnail pass.

use std::time::Duration;

use inkpoint_core::recents::lock_recents;
use inkpoint_core::{Button, MockFileSystem, RecentEntriesStore};
use inkpoint_scenario_harness::{Scenario, ScenarioHarness};

fn library_fs() -> MockFileSystem {
    let mut fs = MockFileSystem::new();
    fs.add_dir("/books");
    fs.add_file("/books/a.epub", 10);
    fs.add_file("/books/b.epub", 10);
    fs.add_file("/books/c.epub", 10);
    fs
}

fn recent(path: &str, title: &str, cover: &str) -> (String, String, String, String) {
    (
        path.to_string(),
        title.to_string(),
        String::new(),
        cover.to_string(),
    )
}

#[test]
fn opening_a_listed_document_moves_it_to_the_front() {
    // Store seeded most-recent-first as [a, b, c].
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: library_fs(),
        recents: vec![
            recent("/books/a.epub", "A", ""),
            recent("/books/b.epub", "B", ""),
            recent("/books/c.epub", "C", ""),
        ],
        ..Scenario::default()
    });

    // Open B from the home tiles (tile order matches store order).
    harness.press(Button::Next);
    harness.press(Button::Confirm);
    assert_eq!(harness.shell().current_activity(), Some("reader"));

    let store = harness.shell().recents();
    let order: Vec<String> = lock_recents(&store)
        .entries()
        .iter()
        .map(|entry| entry.path.clone())
        .collect();
    assert_eq!(order, vec!["/books/b.epub", "/books/a.epub", "/books/c.epub"]);
}

#[test]
fn recents_order_survives_a_reboot() {
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: library_fs(),
        ..Scenario::default()
    });

    // Open a.epub then b.epub through the browser.
    harness.press(Button::Confirm); // Browse Files
    harness.press(Button::Confirm); // open a.epub
    harness.press(Button::Back); // home
    harness.press(Button::Next); // past the new tile
    harness.press(Button::Confirm); // Browse Files again
    harness.press(Button::Next); // a.epub -> b.epub
    harness.press(Button::Confirm); // open b.epub
    harness.press(Button::Back); // home

    let paths = harness.state_paths();
    let state_dir = harness.into_state_dir();

    let record = RecentEntriesStore::load(&paths.recents, 10);
    let order: Vec<String> = record
        .entries()
        .iter()
        .map(|entry| entry.path.clone())
        .collect();
    assert_eq!(order, vec!["/books/b.epub", "/books/a.epub"]);

    // Second boot hydrates the same order from the record.
    let harness = ScenarioHarness::boot_in(
        Scenario {
            fs: library_fs(),
            ..Scenario::default()
        },
        state_dir,
    );
    let store = harness.shell().recents();
    let order: Vec<String> = lock_recents(&store)
        .entries()
        .iter()
        .map(|entry| entry.path.clone())
        .collect();
    assert_eq!(order, vec!["/books/b.epub", "/books/a.epub"]);
}

#[test]
fn a_remembered_open_book_boots_straight_into_the_reader() {
    let harness = ScenarioHarness::boot(Scenario {
        fs: library_fs(),
        open_book: Some("/books/c.epub".to_string()),
        ..Scenario::default()
    });
    assert_eq!(harness.shell().current_activity(), Some("reader"));
}

#[test]
fn failed_cover_generation_is_cleared_in_the_persistent_record() {
    let harness = ScenarioHarness::boot(Scenario {
        fs: library_fs(),
        recents: vec![
            recent("/books/a.epub", "A", "/covers/a.bmp"),
            recent("/books/b.epub", "B", "/covers/b.bmp"),
        ],
        failing_covers: vec!["/covers/a.bmp".to_string()],
        ..Scenario::default()
    });

    // The cover pass runs on the render task after the first paint.
    let store = harness.shell().recents();
    let cleared = harness.wait_until(Duration::from_secs(3), |_| {
        lock_recents(&store).entries()[0].cover_path.is_empty()
    });
    assert!(cleared, "failing cover reference never cleared");

    let store = lock_recents(&store);
    // The failed entry stays, minus its cover; the good one is untouched.
    assert_eq!(store.entries()[0].path, "/books/a.epub");
    assert_eq!(store.entries()[0].cover_path, "");
    assert_eq!(store.entries()[1].cover_path, "/covers/b.bmp");
    drop(store);

    // And the on-card record already reflects it.
    let paths = harness.state_paths();
    let record = RecentEntriesStore::load(&paths.recents, 10);
    assert_eq!(record.entries()[0].cover_path, "");
    assert_eq!(record.entries()[1].cover_path, "/covers/b.bmp");
}
