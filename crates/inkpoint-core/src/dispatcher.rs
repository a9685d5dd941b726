//! Activity ownership and navigation.
//!
//! The dispatcher owns the single current activity and guarantees the
//! teardown-before-construction ordering: `exit` runs the old activity's
//! `on_exit` (which waits out any in-flight redraw) and drops it before
//! `enter` touches the replacement.
//!
//! Activities never hold references to each other. They are handed
//! closures at construction; the closures push a [`NavTarget`] onto the
//! navigator queue, and the shell drains the queue after the tick that
//! requested it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::activity::Activity;
use crate::input::ButtonStates;

/// Navigation destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Home,
    Reader { path: String },
    BrowseFiles,
    Recents,
    OpdsBrowser,
    FileTransfer,
    Settings,
}

/// Cloneable handle for requesting screen changes.
#[derive(Clone, Default)]
pub struct Navigator {
    queue: Arc<Mutex<VecDeque<NavTarget>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, target: NavTarget) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push_back(target),
            Err(poisoned) => poisoned.into_inner().push_back(target),
        }
    }

    /// Pop the oldest pending request.
    pub fn take(&self) -> Option<NavTarget> {
        match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }
}

/// Owner of the current activity.
#[derive(Default)]
pub struct ActivityDispatcher {
    current: Option<Box<dyn Activity>>,
}

impl ActivityDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down and drop the current activity, if any. Must be called
    /// before `enter` of a replacement.
    pub fn exit(&mut self) {
        if let Some(mut activity) = self.current.take() {
            log::info!("exiting activity {}", activity.name());
            activity.on_exit();
        }
    }

    /// Make `activity` current and run its entry hook.
    pub fn enter(&mut self, mut activity: Box<dyn Activity>) {
        debug_assert!(
            self.current.is_none(),
            "enter without exit of the previous activity"
        );
        log::info!("entering activity {}", activity.name());
        activity.on_enter();
        self.current = Some(activity);
    }

    pub fn tick(&mut self, input: &ButtonStates) {
        if let Some(activity) = self.current.as_mut() {
            activity.tick(input);
        }
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|activity| activity.name())
    }

    pub fn skip_tick_delay(&self) -> bool {
        self.current
            .as_ref()
            .map(|activity| activity.skip_tick_delay())
            .unwrap_or(false)
    }
}
