//! Power state machine: inactivity sleep, long-press sleep, wake
//! verification.
//!
//! Waking from deep sleep restarts the whole program, so the "states" that
//! matter at runtime are Awake (normal loop), VerifyingWake (just booted
//! from a wake signal, deciding whether it was genuine) and Sleeping
//! (terminal for this boot session).

use crate::clock::Clock;
use crate::input::{Button, ButtonStates, InputPort};

/// Grace window for the user to start holding the power button after a
/// wake signal.
pub const WAKE_GRACE_MS: u64 = 1000;
/// Poll interval while verifying a wake press.
pub const WAKE_POLL_MS: u64 = 10;
/// Waking from deep sleep costs roughly this long before the first input
/// sample; deducted from the required hold so the user doesn't pay for it.
pub const WAKE_CALIBRATION_MS: u64 = 25;
/// Poll interval while waiting for the power button to be released.
pub const RELEASE_POLL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerPhase {
    Awake,
    VerifyingWake,
    Sleeping,
}

/// Why the controller decided to sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepReason {
    Inactivity,
    ButtonHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeVerdict {
    Confirmed,
    Spurious,
}

/// Platform deep-sleep boundary.
pub trait SleepControl: Send {
    /// Re-arm the hardware wake trigger on the power-button line.
    fn arm_wake_on_power_button(&mut self);

    /// Enter platform deep sleep. On hardware this does not return; host
    /// implementations record the call and do.
    fn enter_deep_sleep(&mut self);
}

pub struct PowerController {
    phase: PowerPhase,
    last_activity_ms: u64,
}

impl PowerController {
    pub fn new(now_ms: u64) -> Self {
        Self {
            phase: PowerPhase::Awake,
            last_activity_ms: now_ms,
        }
    }

    pub fn phase(&self) -> PowerPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: PowerPhase) {
        self.phase = phase;
    }

    /// Feed one tick of input state. Any press or release edge counts as
    /// activity and resets the inactivity window.
    pub fn observe(&mut self, input: &ButtonStates, now_ms: u64) {
        if input.any_pressed() || input.any_released() {
            self.last_activity_ms = now_ms;
        }
    }

    /// Decide whether to stay awake this tick. Timeouts come from the live
    /// settings so a settings change applies without a reboot.
    pub fn check_sleep(
        &self,
        input: &ButtonStates,
        now_ms: u64,
        auto_sleep_timeout_ms: u64,
        power_button_hold_ms: u64,
    ) -> Option<SleepReason> {
        if self.phase != PowerPhase::Awake {
            return None;
        }
        if now_ms.saturating_sub(self.last_activity_ms) >= auto_sleep_timeout_ms {
            return Some(SleepReason::Inactivity);
        }
        if input.is_pressed(Button::Power) && input.held_ms(Button::Power) > power_button_hold_ms {
            return Some(SleepReason::ButtonHold);
        }
        None
    }
}

/// Verify that the press that woke the device is a genuine long press.
///
/// The user gets [`WAKE_GRACE_MS`] to be holding the button, and must then
/// keep holding for the configured duration minus the wake calibration.
/// Anything less is a spurious wake and the caller re-enters sleep without
/// constructing any activity.
pub fn verify_wake_press(
    clock: &dyn Clock,
    port: &mut dyn InputPort,
    buttons: &mut ButtonStates,
    power_button_hold_ms: u64,
) -> WakeVerdict {
    let start = clock.now_ms();
    let required = power_button_hold_ms
        .saturating_sub(WAKE_CALIBRATION_MS)
        .max(1);

    buttons.update(port.sample(), clock.now_ms());
    while !buttons.is_pressed(Button::Power) && clock.now_ms().saturating_sub(start) < WAKE_GRACE_MS
    {
        clock.sleep_ms(WAKE_POLL_MS);
        buttons.update(port.sample(), clock.now_ms());
    }
    if !buttons.is_pressed(Button::Power) {
        log::info!("wake signal with no held button, returning to sleep");
        return WakeVerdict::Spurious;
    }

    while buttons.is_pressed(Button::Power) && buttons.held_ms(Button::Power) < required {
        clock.sleep_ms(WAKE_POLL_MS);
        buttons.update(port.sample(), clock.now_ms());
    }
    if buttons.held_ms(Button::Power) < required {
        log::info!("wake press released early, returning to sleep");
        WakeVerdict::Spurious
    } else {
        WakeVerdict::Confirmed
    }
}

/// Block until the power button is fully released. Called before deep
/// sleep so a still-held button cannot immediately re-wake the device,
/// and at the end of boot so the wake press doesn't leak into the UI.
pub fn wait_for_power_release(
    clock: &dyn Clock,
    port: &mut dyn InputPort,
    buttons: &mut ButtonStates,
) {
    buttons.update(port.sample(), clock.now_ms());
    while buttons.is_pressed(Button::Power) {
        clock.sleep_ms(RELEASE_POLL_MS);
        buttons.update(port.sample(), clock.now_ms());
    }
}
