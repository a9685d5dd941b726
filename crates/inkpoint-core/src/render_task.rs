//! Background redraw task.
//!
//! One task per activity that repaints, created on entry and halted on
//! exit. The main loop never draws; it marks the dirty flag and moves on.
//! The task polls the flag on a short interval and performs the whole
//! redraw while holding the shared render lock, so a redraw is never
//! interrupted and teardown can synchronize by taking the same lock.
//!
//! Dirty marks coalesce: any number of marks between two polls produce a
//! single redraw of the latest state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::renderer::{lock, GfxRenderer, SharedRenderer};

/// Poll interval for the dirty flag. Polling instead of a wake signal is a
/// deliberate simplicity trade-off; panel refresh latency dominates.
pub const RENDER_POLL_MS: u64 = 15;

/// Flags shared between the owning activity and its render task.
#[derive(Default)]
pub struct RenderSignals {
    dirty: AtomicBool,
    halt: AtomicBool,
}

impl RenderSignals {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Request a redraw. Safe from any thread; repeated marks coalesce.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Consume the dirty flag at the start of a draw cycle.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    fn halted(&self) -> bool {
        self.halt.load(Ordering::SeqCst)
    }

    fn raise_halt(&self) {
        self.halt.store(true, Ordering::SeqCst);
    }
}

/// One poll cycle: redraw under the render lock if the dirty flag was set.
/// Returns whether a draw happened.
pub fn render_cycle<F>(signals: &RenderSignals, renderer: &SharedRenderer, draw: &mut F) -> bool
where
    F: FnMut(&mut GfxRenderer),
{
    if !signals.take_dirty() {
        return false;
    }
    let mut guard = lock(renderer);
    draw(&mut guard);
    true
}

/// Handle to a spawned render thread.
pub struct RenderTask {
    signals: Arc<RenderSignals>,
    renderer: SharedRenderer,
    handle: Option<JoinHandle<()>>,
}

impl RenderTask {
    /// Spawn the render thread. `draw` runs with the render lock held for
    /// the duration of each redraw.
    pub fn spawn<F>(renderer: SharedRenderer, signals: Arc<RenderSignals>, mut draw: F) -> Self
    where
        F: FnMut(&mut GfxRenderer) + Send + 'static,
    {
        let thread_renderer = Arc::clone(&renderer);
        let thread_signals = Arc::clone(&signals);
        let handle = std::thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                while !thread_signals.halted() {
                    render_cycle(&thread_signals, &thread_renderer, &mut draw);
                    std::thread::sleep(Duration::from_millis(RENDER_POLL_MS));
                }
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("render task spawn failed: {}", err);
                None
            }
        };
        Self {
            signals,
            renderer,
            handle,
        }
    }

    /// Stop the task. Takes the render lock first, so a redraw that is
    /// already in flight completes before this returns; a redraw that has
    /// not started yet never will.
    pub fn halt(&mut self) {
        {
            let _guard = lock(&self.renderer);
            self.signals.raise_halt();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("render task panicked");
            }
        }
    }
}

impl Drop for RenderTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.halt();
        }
    }
}
