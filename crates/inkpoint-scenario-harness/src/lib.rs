//! Host-side scenario harness for scripted device flows.
//!
//! Couples the shell with a scripted clock, scripted input, a recording
//! panel, and an in-memory card, so whole boot/navigate/sleep sessions run
//! deterministically in tests. Also exports PNG screenshots of the last
//! presented frame.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use png::{BitDepth, ColorType, Encoder};
use tempfile::TempDir;

use inkpoint_core::{
    Button, ButtonLevels, DeviceSettings, InputPort, ManualClock, MockFileSystem, PanelProbe,
    RecentEntriesStore, ScriptedCovers, ScriptedPort, SessionStateStore, SettingsStore, Shell,
    ShellDeps, SleepControl, StoragePaths, TestPanel, TickOutcome, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

/// Clock step per harness tick, matching the shell's idle delay.
pub const TICK_MS: u64 = 10;

/// Input port shared between the harness and the shell.
#[derive(Clone)]
struct SharedPort(Arc<Mutex<ScriptedPort>>);

impl InputPort for SharedPort {
    fn sample(&mut self) -> ButtonLevels {
        match self.0.lock() {
            Ok(mut port) => port.sample(),
            Err(poisoned) => poisoned.into_inner().sample(),
        }
    }
}

/// Deep-sleep recorder.
#[derive(Default)]
struct RecordingSleep {
    armed: Arc<AtomicU32>,
    slept: Arc<AtomicU32>,
}

impl SleepControl for RecordingSleep {
    fn arm_wake_on_power_button(&mut self) {
        self.armed.fetch_add(1, Ordering::SeqCst);
    }

    fn enter_deep_sleep(&mut self) {
        self.slept.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scenario configuration, consumed by [`ScenarioHarness::boot`].
pub struct Scenario {
    pub fs: MockFileSystem,
    pub settings: Option<DeviceSettings>,
    pub recents: Vec<(String, String, String, String)>,
    pub open_book: Option<String>,
    pub failing_covers: Vec<String>,
    pub storage_ok: bool,
    pub booted_from_deep_sleep: bool,
    pub wake_hold_samples: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            fs: MockFileSystem::new(),
            settings: None,
            recents: Vec::new(),
            open_book: None,
            failing_covers: Vec::new(),
            storage_ok: true,
            booted_from_deep_sleep: false,
            wake_hold_samples: 0,
        }
    }
}

pub struct ScenarioHarness {
    shell: Shell,
    clock: Arc<ManualClock>,
    probe: Arc<PanelProbe>,
    port: Arc<Mutex<ScriptedPort>>,
    armed: Arc<AtomicU32>,
    slept: Arc<AtomicU32>,
    state_dir: TempDir,
}

impl ScenarioHarness {
    /// Seed the card records, then run the shell boot sequence.
    pub fn boot(scenario: Scenario) -> Self {
        Self::boot_in(scenario, TempDir::new().expect("scenario state dir"))
    }

    /// Boot against an existing state directory, for reboot scenarios.
    pub fn boot_in(scenario: Scenario, state_dir: TempDir) -> Self {
        let paths = StoragePaths::under(state_dir.path());

        if let Some(settings) = &scenario.settings {
            let mut store = SettingsStore::load(paths.settings.clone());
            assert!(store.set(settings.clone()), "seeding settings must work");
        }
        if !scenario.recents.is_empty() {
            let retained = scenario
                .settings
                .as_ref()
                .map(|settings| settings.recent_max)
                .unwrap_or(DeviceSettings::default().recent_max)
                .max(scenario.recents.len());
            let mut store = RecentEntriesStore::new(retained);
            for (path, title, author, cover) in scenario.recents.iter().rev() {
                store.add_or_promote(path, title, author, cover);
            }
            assert!(store.save(&paths.recents), "seeding recents must work");
        }
        if let Some(book) = &scenario.open_book {
            let mut session = SessionStateStore::load(paths.session.clone());
            assert!(session.set_open_book(book), "seeding session must work");
        }

        let mut covers = ScriptedCovers::new();
        for cover in &scenario.failing_covers {
            covers.fail_for(cover);
        }

        let clock = Arc::new(ManualClock::new());
        let (panel, probe) = TestPanel::new();
        let mut scripted = ScriptedPort::new();
        if scenario.wake_hold_samples > 0 {
            scripted.push_samples(
                ButtonLevels::only(Button::Power),
                scenario.wake_hold_samples,
            );
            scripted.set_resting(ButtonLevels::released());
        }
        let port = Arc::new(Mutex::new(scripted));
        let sleep = RecordingSleep::default();
        let armed = Arc::clone(&sleep.armed);
        let slept = Arc::clone(&sleep.slept);

        let deps = ShellDeps {
            clock: Arc::clone(&clock) as Arc<dyn inkpoint_core::Clock>,
            input: Box::new(SharedPort(Arc::clone(&port))),
            panel: Box::new(panel),
            fs: Arc::new(Mutex::new(scenario.fs)),
            covers: Arc::new(Mutex::new(covers)),
            sleeper: Box::new(sleep),
            paths,
            books_root: "/books".to_string(),
            storage_ok: scenario.storage_ok,
            booted_from_deep_sleep: scenario.booted_from_deep_sleep,
        };

        Self {
            shell: Shell::boot(deps),
            clock,
            probe,
            port,
            armed,
            slept,
            state_dir,
        }
    }

    fn set_levels(&self, levels: ButtonLevels) {
        match self.port.lock() {
            Ok(mut port) => port.set_resting(levels),
            Err(poisoned) => poisoned.into_inner().set_resting(levels),
        }
    }

    /// One main-loop tick plus the idle delay's worth of scripted time.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.shell.tick();
        self.clock.advance(TICK_MS);
        outcome
    }

    /// Press and release a button, ticking through both edges.
    pub fn press(&mut self, button: Button) {
        self.set_levels(ButtonLevels::only(button));
        self.tick();
        self.set_levels(ButtonLevels::released());
        self.tick();
    }

    /// Hold the power button for `hold_ms` of scripted time; returns true
    /// when the shell slept during the hold.
    pub fn hold_power_for(&mut self, hold_ms: u64) -> bool {
        let presses = (hold_ms / TICK_MS) as usize + 2;
        match self.port.lock() {
            Ok(mut port) => {
                port.push_samples(ButtonLevels::only(Button::Power), presses);
                port.set_resting(ButtonLevels::released());
            }
            Err(poisoned) => {
                let mut port = poisoned.into_inner();
                port.push_samples(ButtonLevels::only(Button::Power), presses);
                port.set_resting(ButtonLevels::released());
            }
        }
        for _ in 0..presses + 4 {
            if self.tick().slept {
                return true;
            }
        }
        false
    }

    /// Tick through `ms` of scripted idle time, stopping early on sleep.
    pub fn idle_for_ms(&mut self, ms: u64) -> bool {
        for _ in 0..ms / TICK_MS {
            if self.tick().slept {
                return true;
            }
        }
        false
    }

    /// Wait (in real time) for the render task to finish `count` presents.
    pub fn wait_for_presents(&self, count: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.probe.presents_completed() < count {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }

    /// Wait (in real time) until `predicate` holds.
    pub fn wait_until(&self, timeout: Duration, predicate: impl Fn(&Self) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while !predicate(self) {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    pub fn probe(&self) -> &PanelProbe {
        &self.probe
    }

    pub fn deep_sleeps(&self) -> u32 {
        self.slept.load(Ordering::SeqCst)
    }

    pub fn wake_arms(&self) -> u32 {
        self.armed.load(Ordering::SeqCst)
    }

    /// Directory the record files live in, for reboot scenarios.
    pub fn state_paths(&self) -> StoragePaths {
        StoragePaths::under(self.state_dir.path())
    }

    /// Keep the state directory alive past this harness for a reboot.
    pub fn into_state_dir(self) -> TempDir {
        self.state_dir
    }

    /// Save the last presented raster as a grayscale PNG.
    pub fn save_screenshot_png(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let raster = self.probe.last_raster();
        if raster.is_empty() {
            return Err("nothing presented yet".to_string());
        }
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let width_bytes = (DISPLAY_WIDTH / 8) as usize;
        let mut data = Vec::with_capacity((DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize);
        for row in 0..DISPLAY_HEIGHT as usize {
            for col in 0..DISPLAY_WIDTH as usize {
                let byte = raster[row * width_bytes + col / 8];
                let bit = 7 - (col % 8);
                data.push(if byte & (1 << bit) == 0 { 0u8 } else { 255u8 });
            }
        }

        let file = File::create(path).map_err(|e| e.to_string())?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, DISPLAY_WIDTH, DISPLAY_HEIGHT);
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
        png_writer
            .write_image_data(&data)
            .map_err(|e| e.to_string())
    }
}
