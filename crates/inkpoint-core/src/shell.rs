//! Device shell: boot sequence, main loop, navigation wiring.
//!
//! The shell owns the dispatcher, the power controller, and the
//! process-wide stores, and hands each activity the shared renderer plus
//! the navigation closures it needs. Everything hardware-shaped arrives
//! through [`ShellDeps`], so the whole shell runs under the host test
//! harness.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::activities::{
    BootActivity, BrowseFilesActivity, FileTransferActivity, FullScreenMessageActivity,
    HomeActivity, HomeCallbacks, OpdsBrowserActivity, ReaderActivity, RecentsActivity,
    SettingsActivity, SleepActivity,
};
use crate::activity::Activity;
use crate::clock::Clock;
use crate::covers::SharedCovers;
use crate::dispatcher::{ActivityDispatcher, NavTarget, Navigator};
use crate::display::DisplayDevice;
use crate::filesystem::SharedFs;
use crate::input::{ButtonStates, InputPort};
use crate::power::{
    verify_wake_press, wait_for_power_release, PowerController, PowerPhase, SleepControl,
    WakeVerdict,
};
use crate::recents::{lock_recents, RecentEntriesStore, SharedRecents};
use crate::renderer::{lock, GfxRenderer, SharedRenderer};
use crate::session_state::{lock_session, SessionStateStore, SharedSession};
use crate::settings::{lock_settings, SettingsStore, SharedSettings};

/// Idle delay between main-loop ticks when no activity asked for tight
/// ticking.
pub const IDLE_TICK_DELAY_MS: u64 = 10;

/// Record file locations on the card.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub settings: PathBuf,
    pub session: PathBuf,
    pub recents: PathBuf,
}

impl StoragePaths {
    /// Conventional layout under one state directory.
    pub fn under(dir: &Path) -> Self {
        Self {
            settings: dir.join("settings.tsv"),
            session: dir.join("session.tsv"),
            recents: dir.join("recents.tsv"),
        }
    }
}

/// Everything the shell needs from the platform.
pub struct ShellDeps {
    pub clock: Arc<dyn Clock>,
    pub input: Box<dyn InputPort>,
    pub panel: Box<dyn DisplayDevice>,
    pub fs: SharedFs,
    pub covers: SharedCovers,
    pub sleeper: Box<dyn SleepControl>,
    pub paths: StoragePaths,
    /// Directory scanned by the file browser.
    pub books_root: String,
    /// Result of storage init; false is terminal (full-screen error).
    pub storage_ok: bool,
    /// True when the hardware reports a deep-sleep wake as the boot cause.
    pub booted_from_deep_sleep: bool,
}

/// Result of one main-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// The shell entered deep sleep during this tick; the session is over.
    pub slept: bool,
    /// The current activity asked to skip the idle delay.
    pub skip_delay: bool,
}

pub struct Shell {
    clock: Arc<dyn Clock>,
    input: Box<dyn InputPort>,
    buttons: ButtonStates,
    renderer: SharedRenderer,
    fs: SharedFs,
    covers: SharedCovers,
    store: SharedRecents,
    settings: SharedSettings,
    session: SharedSession,
    navigator: Navigator,
    dispatcher: ActivityDispatcher,
    power: PowerController,
    sleeper: Box<dyn SleepControl>,
    books_root: String,
    fatal: bool,
    max_tick_ms: u64,
}

impl Shell {
    /// Run the boot sequence: storage check, settings, wake verification,
    /// splash, then resume-or-home. Returns the shell ready for ticking
    /// (or already sleeping / fatal).
    pub fn boot(deps: ShellDeps) -> Self {
        let ShellDeps {
            clock,
            input,
            panel,
            fs,
            covers,
            sleeper,
            paths,
            books_root,
            storage_ok,
            booted_from_deep_sleep,
        } = deps;

        let renderer = GfxRenderer::shared(panel);
        let settings = SettingsStore::load(paths.settings.clone());
        let power_button_hold_ms = settings.get().power_button_hold_ms;
        let recent_max = settings.get().recent_max;

        let mut shell = Self {
            clock,
            input,
            buttons: ButtonStates::new(),
            renderer,
            fs,
            covers,
            store: Arc::new(Mutex::new(RecentEntriesStore::new(recent_max))),
            settings: Arc::new(Mutex::new(settings)),
            session: Arc::new(Mutex::new(SessionStateStore::load(paths.session.clone()))),
            navigator: Navigator::new(),
            dispatcher: ActivityDispatcher::new(),
            power: PowerController::new(0),
            sleeper,
            books_root,
            fatal: false,
            max_tick_ms: 0,
        };
        shell.power = PowerController::new(shell.clock.now_ms());

        if !storage_ok {
            log::error!("storage init failed; device is inert");
            shell.fatal = true;
            shell.dispatcher.enter(Box::new(FullScreenMessageActivity::new(
                Arc::clone(&shell.renderer),
                "Storage card error",
            )));
            return shell;
        }

        // Verify the wake press before doing any expensive init; a
        // spurious wake goes straight back to sleep.
        if booted_from_deep_sleep {
            shell.power.set_phase(PowerPhase::VerifyingWake);
            let verdict = verify_wake_press(
                shell.clock.as_ref(),
                shell.input.as_mut(),
                &mut shell.buttons,
                power_button_hold_ms,
            );
            match verdict {
                WakeVerdict::Confirmed => shell.power.set_phase(PowerPhase::Awake),
                WakeVerdict::Spurious => {
                    shell.sleeper.arm_wake_on_power_button();
                    shell.sleeper.enter_deep_sleep();
                    shell.power.set_phase(PowerPhase::Sleeping);
                    return shell;
                }
            }
        }

        shell
            .dispatcher
            .enter(Box::new(BootActivity::new(Arc::clone(&shell.renderer))));

        *lock_recents(&shell.store) = RecentEntriesStore::load(&paths.recents, recent_max);

        // Resume the open document from the previous session. The record
        // is cleared and saved *before* the reader comes up, so a
        // document that crashes the reader cannot boot-loop the device.
        let resume = {
            let mut session = lock_session(&shell.session);
            let path = session.open_book_path().map(str::to_string);
            if path.is_some() {
                session.clear_open_book();
            }
            path
        };
        match resume {
            Some(path) => {
                log::info!("resuming {}", path);
                shell.goto(&NavTarget::Reader { path });
            }
            None => shell.goto(&NavTarget::Home),
        }

        // Don't let the tail of the wake press leak into the UI.
        wait_for_power_release(
            shell.clock.as_ref(),
            shell.input.as_mut(),
            &mut shell.buttons,
        );
        shell
    }

    /// One main-loop iteration: input, power decisions, activity tick,
    /// navigation drain.
    pub fn tick(&mut self) -> TickOutcome {
        if self.power.phase() == PowerPhase::Sleeping {
            return TickOutcome {
                slept: true,
                skip_delay: false,
            };
        }

        let tick_start = self.clock.now_ms();
        let levels = self.input.sample();
        self.buttons.update(levels, tick_start);
        self.power.observe(&self.buttons, tick_start);

        if !self.fatal {
            let (auto_sleep_ms, hold_ms) = {
                let settings = lock_settings(&self.settings);
                (
                    settings.get().auto_sleep_timeout_ms,
                    settings.get().power_button_hold_ms,
                )
            };
            if let Some(reason) =
                self.power
                    .check_sleep(&self.buttons, tick_start, auto_sleep_ms, hold_ms)
            {
                log::info!("entering deep sleep: {:?}", reason);
                self.enter_sleep();
                return TickOutcome {
                    slept: true,
                    skip_delay: false,
                };
            }
        }

        self.dispatcher.tick(&self.buttons);

        while let Some(target) = self.navigator.take() {
            if self.fatal {
                break;
            }
            log::info!("navigating to {:?}", target);
            self.goto(&target);
        }

        let elapsed = self.clock.now_ms().saturating_sub(tick_start);
        if elapsed > self.max_tick_ms {
            self.max_tick_ms = elapsed;
            if elapsed > 50 {
                log::warn!("new max main-loop tick: {} ms", elapsed);
            }
        }

        TickOutcome {
            slept: false,
            skip_delay: self.dispatcher.skip_tick_delay(),
        }
    }

    /// Tick until deep sleep ends the session. On hardware this is the
    /// whole life of one boot.
    pub fn run(&mut self) {
        loop {
            let outcome = self.tick();
            if outcome.slept {
                break;
            }
            if outcome.skip_delay {
                std::thread::yield_now();
            } else {
                self.clock.sleep_ms(IDLE_TICK_DELAY_MS);
            }
        }
    }

    /// Tear down the current activity, park the sleep screen, and suspend.
    /// Blocks until the panel is asleep and the power button is released;
    /// terminal for this boot session.
    fn enter_sleep(&mut self) {
        self.dispatcher.exit();
        self.dispatcher
            .enter(Box::new(SleepActivity::new(Arc::clone(&self.renderer))));
        lock(&self.renderer).sleep_panel();
        self.sleeper.arm_wake_on_power_button();
        // A still-held power button would re-wake the device immediately.
        wait_for_power_release(
            self.clock.as_ref(),
            self.input.as_mut(),
            &mut self.buttons,
        );
        self.sleeper.enter_deep_sleep();
        self.power.set_phase(PowerPhase::Sleeping);
    }

    /// Exit the current activity and enter the one for `target`.
    fn goto(&mut self, target: &NavTarget) {
        let activity = self.build_activity(target);
        self.dispatcher.exit();
        self.dispatcher.enter(activity);
    }

    fn nav_to(&self, target: NavTarget) -> Box<dyn Fn()> {
        let navigator = self.navigator.clone();
        Box::new(move || navigator.request(target.clone()))
    }

    fn nav_open_book(&self) -> Box<dyn Fn(String)> {
        let navigator = self.navigator.clone();
        Box::new(move |path| navigator.request(NavTarget::Reader { path }))
    }

    fn build_activity(&self, target: &NavTarget) -> Box<dyn Activity> {
        match target {
            NavTarget::Home => {
                let settings = lock_settings(&self.settings).get().clone();
                let callbacks = HomeCallbacks {
                    open_book: self.nav_open_book(),
                    browse_files: self.nav_to(NavTarget::BrowseFiles),
                    recents: self.nav_to(NavTarget::Recents),
                    opds_browser: self.nav_to(NavTarget::OpdsBrowser),
                    file_transfer: self.nav_to(NavTarget::FileTransfer),
                    settings: self.nav_to(NavTarget::Settings),
                };
                Box::new(HomeActivity::new(
                    Arc::clone(&self.renderer),
                    Arc::clone(&self.store),
                    Arc::clone(&self.fs),
                    Arc::clone(&self.covers),
                    callbacks,
                    settings.recent_max,
                    settings.cover_height,
                    settings.opds_url,
                ))
            }
            NavTarget::Reader { path } => Box::new(ReaderActivity::new(
                Arc::clone(&self.renderer),
                Arc::clone(&self.store),
                Arc::clone(&self.fs),
                Arc::clone(&self.session),
                path.clone(),
                self.nav_to(NavTarget::Home),
            )),
            NavTarget::BrowseFiles => Box::new(BrowseFilesActivity::new(
                Arc::clone(&self.renderer),
                Arc::clone(&self.fs),
                self.books_root.clone(),
                self.nav_open_book(),
                self.nav_to(NavTarget::Home),
            )),
            NavTarget::Recents => Box::new(RecentsActivity::new(
                Arc::clone(&self.renderer),
                Arc::clone(&self.store),
                Arc::clone(&self.fs),
                self.nav_open_book(),
                self.nav_to(NavTarget::Home),
            )),
            NavTarget::OpdsBrowser => Box::new(OpdsBrowserActivity::new(
                Arc::clone(&self.renderer),
                lock_settings(&self.settings).get().opds_url.clone(),
                self.nav_to(NavTarget::Home),
            )),
            NavTarget::FileTransfer => Box::new(FileTransferActivity::new(
                Arc::clone(&self.renderer),
                self.nav_to(NavTarget::Home),
            )),
            NavTarget::Settings => Box::new(SettingsActivity::new(
                Arc::clone(&self.renderer),
                Arc::clone(&self.settings),
                self.nav_to(NavTarget::Home),
            )),
        }
    }

    // Accessors for the scenario harness and tests.

    pub fn current_activity(&self) -> Option<&'static str> {
        self.dispatcher.current_name()
    }

    pub fn power_phase(&self) -> PowerPhase {
        self.power.phase()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn recents(&self) -> SharedRecents {
        Arc::clone(&self.store)
    }

    pub fn settings(&self) -> SharedSettings {
        Arc::clone(&self.settings)
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        // Make sure a live render task never outlives the shell.
        self.dispatcher.exit();
    }
}
