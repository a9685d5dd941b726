//! Scripted flows through the home menu and its navigation edges.

use std::time::Duration;

use inkpoint_core::{Button, DeviceSettings, MockFileSystem};
use inkpoint_scenario_harness::{Scenario, ScenarioHarness};

fn books_fs() -> MockFileSystem {
    let mut fs = MockFileSystem::new();
    fs.add_dir("/books");
    fs.add_file("/books/alpha.epub", 100);
    fs.add_file("/books/beta.xtc", 100);
    fs
}

#[test]
fn boot_lands_on_home_and_paints() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        ..Scenario::default()
    });
    assert_eq!(harness.shell().current_activity(), Some("home"));
    // First paint plus the queued second pass.
    assert!(harness.wait_for_presents(2, Duration::from_secs(2)));

    harness.tick();
    let shot = std::path::Path::new("target").join("scenario-screens/home.png");
    harness.save_screenshot_png(&shot).unwrap();
    assert!(shot.exists());
}

#[test]
fn confirm_on_browse_files_opens_the_browser_and_back_returns() {
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        ..Scenario::default()
    });

    // No recents: selector 0 is Browse Files.
    harness.press(Button::Confirm);
    assert_eq!(harness.shell().current_activity(), Some("browse-files"));

    harness.press(Button::Back);
    assert_eq!(harness.shell().current_activity(), Some("home"));
}

#[test]
fn fixed_entry_targets_shift_when_the_opds_url_is_configured() {
    // Without a catalog URL, three steps from the top land on Settings.
    let mut plain = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        ..Scenario::default()
    });
    for _ in 0..3 {
        plain.press(Button::Next);
    }
    plain.press(Button::Confirm);
    assert_eq!(plain.shell().current_activity(), Some("settings"));

    // With one, the same physical position is File Transfer and Settings
    // moved down by exactly one.
    let settings = DeviceSettings {
        opds_url: "http://catalog.example/opds".to_string(),
        ..DeviceSettings::default()
    };
    let mut with_opds = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        settings: Some(settings.clone()),
        ..Scenario::default()
    });
    for _ in 0..3 {
        with_opds.press(Button::Next);
    }
    with_opds.press(Button::Confirm);
    assert_eq!(with_opds.shell().current_activity(), Some("file-transfer"));

    let mut with_opds = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        settings: Some(settings),
        ..Scenario::default()
    });
    for _ in 0..4 {
        with_opds.press(Button::Next);
    }
    with_opds.press(Button::Confirm);
    assert_eq!(with_opds.shell().current_activity(), Some("settings"));
}

#[test]
fn opening_a_recent_tile_resumes_that_document() {
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        recents: vec![
            (
                "/books/alpha.epub".to_string(),
                "Alpha".to_string(),
                String::new(),
                String::new(),
            ),
            (
                "/books/beta.xtc".to_string(),
                "Beta".to_string(),
                String::new(),
                String::new(),
            ),
        ],
        ..Scenario::default()
    });

    // Selector 0 is the most recent document's tile.
    harness.press(Button::Confirm);
    assert_eq!(harness.shell().current_activity(), Some("reader"));
    let session = harness.shell().session();
    let open = inkpoint_core::session_state::lock_session(&session)
        .open_book_path()
        .map(str::to_string);
    assert_eq!(open.as_deref(), Some("/books/alpha.epub"));

    harness.press(Button::Back);
    assert_eq!(harness.shell().current_activity(), Some("home"));
}

#[test]
fn browsing_and_opening_a_file_promotes_it_into_recents() {
    let mut harness = ScenarioHarness::boot(Scenario {
        fs: books_fs(),
        ..Scenario::default()
    });

    harness.press(Button::Confirm); // Browse Files
    harness.press(Button::Next); // alpha.epub -> beta.xtc
    harness.press(Button::Confirm); // open
    assert_eq!(harness.shell().current_activity(), Some("reader"));

    let store = harness.shell().recents();
    let first = inkpoint_core::recents::lock_recents(&store).entries()[0]
        .path
        .clone();
    assert_eq!(first, "/books/beta.xtc");

    harness.press(Button::Back);
    assert_eq!(harness.shell().current_activity(), Some("home"));

    // The transfer screen asks for tight ticking; home does not.
    assert!(!harness.tick().skip_delay);
    for _ in 0..3 {
        harness.press(Button::Next);
    }
    harness.press(Button::Confirm); // File Transfer, shifted by one recent tile
    assert_eq!(harness.shell().current_activity(), Some("file-transfer"));
    assert!(harness.tick().skip_delay);
}
