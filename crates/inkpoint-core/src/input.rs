//! Button input tracking.
//!
//! Raw level sampling lives behind [`InputPort`]; [`ButtonStates`] turns
//! successive samples into press/release edges and held durations for the
//! activity tick loop.

/// Physical buttons on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Prev,
    Next,
    Confirm,
    Back,
    Power,
}

impl Button {
    pub const ALL: [Self; 5] = [
        Self::Prev,
        Self::Next,
        Self::Confirm,
        Self::Back,
        Self::Power,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Raw button levels from one hardware sample (true = pressed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pub prev: bool,
    pub next: bool,
    pub confirm: bool,
    pub back: bool,
    pub power: bool,
}

impl ButtonLevels {
    /// All buttons released.
    pub fn released() -> Self {
        Self::default()
    }

    /// Exactly one button pressed.
    pub fn only(button: Button) -> Self {
        let mut levels = Self::default();
        match button {
            Button::Prev => levels.prev = true,
            Button::Next => levels.next = true,
            Button::Confirm => levels.confirm = true,
            Button::Back => levels.back = true,
            Button::Power => levels.power = true,
        }
        levels
    }

    fn level(&self, button: Button) -> bool {
        match button {
            Button::Prev => self.prev,
            Button::Next => self.next,
            Button::Confirm => self.confirm,
            Button::Back => self.back,
            Button::Power => self.power,
        }
    }
}

/// Source of raw button levels (GPIO/ADC on device, a script in tests).
pub trait InputPort: Send {
    fn sample(&mut self) -> ButtonLevels;
}

/// Edge and hold tracking over successive samples.
///
/// `update` must be called exactly once per loop iteration; the
/// `was_*` accessors report edges relative to the previous call.
pub struct ButtonStates {
    current: ButtonLevels,
    previous: ButtonLevels,
    press_started_ms: [Option<u64>; Button::ALL.len()],
    now_ms: u64,
}

impl ButtonStates {
    pub fn new() -> Self {
        Self {
            current: ButtonLevels::released(),
            previous: ButtonLevels::released(),
            press_started_ms: [None; Button::ALL.len()],
            now_ms: 0,
        }
    }

    pub fn update(&mut self, levels: ButtonLevels, now_ms: u64) {
        self.previous = self.current;
        self.current = levels;
        self.now_ms = now_ms;
        for button in Button::ALL {
            let idx = button.index();
            if self.current.level(button) {
                if self.press_started_ms[idx].is_none() {
                    self.press_started_ms[idx] = Some(now_ms);
                }
            } else {
                self.press_started_ms[idx] = None;
            }
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.current.level(button)
    }

    /// Rising edge on the most recent `update`.
    pub fn was_pressed(&self, button: Button) -> bool {
        self.current.level(button) && !self.previous.level(button)
    }

    /// Falling edge on the most recent `update`.
    pub fn was_released(&self, button: Button) -> bool {
        !self.current.level(button) && self.previous.level(button)
    }

    /// How long the button has been continuously held, in ms.
    pub fn held_ms(&self, button: Button) -> u64 {
        match self.press_started_ms[button.index()] {
            Some(start) => self.now_ms.saturating_sub(start),
            None => 0,
        }
    }

    /// Any rising edge on the most recent `update`.
    pub fn any_pressed(&self) -> bool {
        Button::ALL.iter().any(|b| self.was_pressed(*b))
    }

    /// Any falling edge on the most recent `update`.
    pub fn any_released(&self) -> bool {
        Button::ALL.iter().any(|b| self.was_released(*b))
    }
}

impl Default for ButtonStates {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted input port: replays a queue of samples, then holds a resting
/// level. Used by wake-verification tests and the scenario harness.
pub struct ScriptedPort {
    queue: std::collections::VecDeque<ButtonLevels>,
    last: ButtonLevels,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self {
            queue: std::collections::VecDeque::new(),
            last: ButtonLevels::released(),
        }
    }

    /// Queue `count` consecutive samples of `levels`.
    pub fn push_samples(&mut self, levels: ButtonLevels, count: usize) {
        for _ in 0..count {
            self.queue.push_back(levels);
        }
    }

    /// Set the level every sample returns once the queue drains.
    pub fn set_resting(&mut self, levels: ButtonLevels) {
        self.last = levels;
    }
}

impl Default for ScriptedPort {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for ScriptedPort {
    fn sample(&mut self) -> ButtonLevels {
        if let Some(levels) = self.queue.pop_front() {
            self.last = levels;
        }
        self.last
    }
}
