//! Screen lifecycle.
//!
//! One activity is live at a time, owned by the dispatcher. The main loop
//! calls `tick` once per iteration; an activity that needs repainting
//! spawns its own render task on `on_enter` and halts it on `on_exit`.

use crate::input::ButtonStates;

pub trait Activity {
    /// Stable name for logs and tests.
    fn name(&self) -> &'static str;

    /// Called once when the activity becomes current.
    fn on_enter(&mut self);

    /// Called once before the activity is dropped. Must synchronize with
    /// any in-flight redraw before releasing resources.
    fn on_exit(&mut self);

    /// One main-loop iteration: react to input edges, mutate state, mark
    /// the screen dirty. Never draws and never blocks.
    fn tick(&mut self, input: &ButtonStates);

    /// Ask the shell to skip the idle delay between ticks. Activities
    /// polling external work (file transfer) return true.
    fn skip_tick_delay(&self) -> bool {
        false
    }
}
