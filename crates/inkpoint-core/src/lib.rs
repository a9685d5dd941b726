//! Activity lifecycle, rendering concurrency, and power core for the
//! Inkpoint button-driven e-ink reader.
//!
//! The main loop owns input and screen state; each screen ("activity")
//! that needs repainting spawns one background render task which owns the
//! right to drive the slow e-ink panel. Hardware sits behind small traits
//! ([`display::DisplayDevice`], [`filesystem::FileSystem`],
//! [`power::SleepControl`], [`clock::Clock`]) so the whole core runs on a
//! host without a device attached.

#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unwrap_used
    )
)]

pub mod activities;
pub mod activity;
pub mod clock;
pub mod covers;
pub mod dispatcher;
pub mod display;
pub mod filesystem;
pub mod framebuffer;
pub mod input;
pub mod mock_filesystem;
pub mod power;
pub mod recents;
mod record;
pub mod render_task;
pub mod renderer;
pub mod session_state;
pub mod settings;
pub mod shell;
pub mod theme;

pub use activities::{
    BootActivity, BrowseFilesActivity, FileTransferActivity, FullScreenMessageActivity,
    HomeActivity, HomeCallbacks, OpdsBrowserActivity, ReaderActivity, RecentsActivity,
    SettingsActivity, SleepActivity,
};
pub use activity::Activity;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use covers::{
    thumb_cache_path, BmpCoverProvider, CoverError, CoverProvider, ScriptedCovers, SharedCovers,
};
pub use dispatcher::{ActivityDispatcher, NavTarget, Navigator};
pub use display::{DisplayDevice, DisplayError, PanelProbe, TestPanel};
pub use filesystem::{FileInfo, FileSystem, FileSystemError, SharedFs};
pub use framebuffer::FrameBuffer;
pub use input::{Button, ButtonLevels, ButtonStates, InputPort, ScriptedPort};
pub use mock_filesystem::MockFileSystem;
pub use power::{PowerController, PowerPhase, SleepControl, WakeVerdict};
pub use recents::{RecentEntriesStore, RecentEntry, SharedRecents};
pub use render_task::{RenderSignals, RenderTask, RENDER_POLL_MS};
pub use renderer::{GfxRenderer, SharedRenderer};
pub use session_state::{SessionStateStore, SharedSession};
pub use settings::{DeviceSettings, SettingsStore, SharedSettings};
pub use shell::{Shell, ShellDeps, StoragePaths, TickOutcome, IDLE_TICK_DELAY_MS};

/// Panel dimensions in the portrait orientation the UI renders in.
pub const DISPLAY_WIDTH: u32 = 480;
pub const DISPLAY_HEIGHT: u32 = 800;
