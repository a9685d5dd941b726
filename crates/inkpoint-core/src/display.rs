//! Panel driver boundary.
//!
//! A present can take tens to hundreds of milliseconds on real e-ink
//! hardware and must never be interrupted mid-transfer; callers serialize
//! access through the render lock in [`crate::renderer`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum DisplayError {
    Bus(String),
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Bus(msg) => write!(f, "display bus error: {}", msg),
        }
    }
}

impl std::error::Error for DisplayError {}

/// Physical display device.
pub trait DisplayDevice: Send {
    /// Push a full raster to the panel. Slow; blocks until the panel is done.
    fn present(&mut self, raster: &[u8]) -> Result<(), DisplayError>;

    /// Put the panel controller into its lowest-power state.
    fn deep_sleep(&mut self);
}

/// Observation side of [`TestPanel`], shared with tests.
#[derive(Default)]
pub struct PanelProbe {
    presents_started: AtomicU32,
    presents_completed: AtomicU32,
    slept: AtomicBool,
    last_raster: Mutex<Vec<u8>>,
}

impl PanelProbe {
    pub fn presents_started(&self) -> u32 {
        self.presents_started.load(Ordering::SeqCst)
    }

    pub fn presents_completed(&self) -> u32 {
        self.presents_completed.load(Ordering::SeqCst)
    }

    pub fn slept(&self) -> bool {
        self.slept.load(Ordering::SeqCst)
    }

    /// The most recently presented raster (empty before the first present).
    pub fn last_raster(&self) -> Vec<u8> {
        match self.last_raster.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Recording panel for host tests.
///
/// Counts presents and optionally injects artificial latency so tests can
/// observe teardown-vs-redraw ordering.
pub struct TestPanel {
    probe: Arc<PanelProbe>,
    latency: Duration,
}

impl TestPanel {
    pub fn new() -> (Self, Arc<PanelProbe>) {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> (Self, Arc<PanelProbe>) {
        let probe = Arc::new(PanelProbe::default());
        (
            Self {
                probe: Arc::clone(&probe),
                latency,
            },
            probe,
        )
    }
}

impl DisplayDevice for TestPanel {
    fn present(&mut self, raster: &[u8]) -> Result<(), DisplayError> {
        self.probe.presents_started.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        match self.probe.last_raster.lock() {
            Ok(mut guard) => {
                guard.clear();
                guard.extend_from_slice(raster);
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.clear();
                guard.extend_from_slice(raster);
            }
        }
        self.probe.presents_completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn deep_sleep(&mut self) {
        self.probe.slept.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_records_presents_and_sleep() {
        let (mut panel, probe) = TestPanel::new();
        panel.present(&[0xAB, 0xCD]).unwrap();
        assert_eq!(probe.presents_started(), 1);
        assert_eq!(probe.presents_completed(), 1);
        assert_eq!(probe.last_raster(), vec![0xAB, 0xCD]);
        assert!(!probe.slept());
        panel.deep_sleep();
        assert!(probe.slept());
    }
}
