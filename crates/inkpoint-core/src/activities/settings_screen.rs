//! Device settings screen.
//!
//! Confirm cycles the selected row through its preset values and writes
//! the record back immediately; a failed write keeps the new value active
//! in memory.

use crate::activity::Activity;
use crate::input::{Button, ButtonStates};
use crate::renderer::{lock, SharedRenderer};
use crate::settings::{lock_settings, SharedSettings};
use crate::theme::{self, layout};

const AUTO_SLEEP_CHOICES_MS: [u64; 3] = [5 * 60 * 1000, 10 * 60 * 1000, 30 * 60 * 1000];
const POWER_HOLD_CHOICES_MS: [u64; 3] = [1000, 1500, 2000];
const RECENT_MAX_CHOICES: [usize; 3] = [3, 5, 8];

const ROW_COUNT: usize = 3;

pub struct SettingsActivity {
    renderer: SharedRenderer,
    settings: SharedSettings,
    selector: usize,
    on_go_home: Box<dyn Fn()>,
}

impl SettingsActivity {
    pub fn new(
        renderer: SharedRenderer,
        settings: SharedSettings,
        on_go_home: Box<dyn Fn()>,
    ) -> Self {
        Self {
            renderer,
            settings,
            selector: 0,
            on_go_home,
        }
    }

    fn cycle<T: Copy + PartialEq>(choices: &[T], current: T) -> T {
        let position = choices.iter().position(|choice| *choice == current);
        match position {
            Some(index) => choices[(index + 1) % choices.len()],
            // A value edited outside the presets snaps to the first one.
            None => choices[0],
        }
    }

    fn cycle_selected(&mut self) {
        let mut store = lock_settings(&self.settings);
        let mut settings = store.get().clone();
        match self.selector {
            0 => {
                settings.auto_sleep_timeout_ms =
                    Self::cycle(&AUTO_SLEEP_CHOICES_MS, settings.auto_sleep_timeout_ms)
            }
            1 => {
                settings.power_button_hold_ms =
                    Self::cycle(&POWER_HOLD_CHOICES_MS, settings.power_button_hold_ms)
            }
            _ => settings.recent_max = Self::cycle(&RECENT_MAX_CHOICES, settings.recent_max),
        }
        if !store.set(settings) {
            log::warn!("settings change not persisted");
        }
    }

    fn redraw(&self) {
        let (auto_sleep, power_hold, recent_max) = {
            let store = lock_settings(&self.settings);
            let settings = store.get();
            (
                settings.auto_sleep_timeout_ms,
                settings.power_button_hold_ms,
                settings.recent_max,
            )
        };
        let rows = [
            format!("Auto sleep: {} min", auto_sleep / 60_000),
            format!("Power button hold: {} ms", power_hold),
            format!("Home recent tiles: {}", recent_max),
        ];

        let mut renderer = lock(&self.renderer);
        let fb = renderer.framebuffer();
        fb.clear();
        let _ = theme::draw_header(fb, "Settings");
        for (row, label) in rows.iter().enumerate() {
            let _ = theme::draw_menu_row(
                fb,
                label,
                layout::HEADER_H + 8 + row as i32 * layout::MENU_ROW_H,
                row == self.selector,
            );
        }
        let _ = theme::draw_button_hints(fb, "Back  Change  Prev  Next");
        renderer.present();
    }
}

impl Activity for SettingsActivity {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn on_enter(&mut self) {
        self.selector = 0;
        self.redraw();
    }

    fn on_exit(&mut self) {}

    fn tick(&mut self, input: &ButtonStates) {
        if input.was_released(Button::Back) {
            (self.on_go_home)();
        } else if input.was_released(Button::Confirm) {
            self.cycle_selected();
            self.redraw();
        } else if input.was_pressed(Button::Prev) {
            self.selector = (self.selector + ROW_COUNT - 1) % ROW_COUNT;
            self.redraw();
        } else if input.was_pressed(Button::Next) {
            self.selector = (self.selector + 1) % ROW_COUNT;
            self.redraw();
        }
    }
}
