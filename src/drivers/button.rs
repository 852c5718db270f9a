//! Polled, time-debounced keypad sampler.
//!
//! ## Hardware
//!
//! Five active-low momentary switches with pull-ups.  There are no
//! interrupts: the navigator samples the raw level of every button the
//! current screen handles on each pass of the foreground loop and asks
//! [`ButtonSampler::sample`] whether that pass counts as a press.
//!
//! ## Debounce rule
//!
//! | Step | Rule                                                        |
//! |------|-------------------------------------------------------------|
//! | 1    | level differs from the previous sample → restart the window |
//! | 2    | `now - last_transition > debounce` → level is settled        |
//! | 3    | settled and at pressed polarity → press on this pass         |
//! | 4    | remember the raw level, whatever happened above              |
//!
//! A button held past the window keeps firing every pass under
//! [`RepeatPolicy::Repeat`].

use crate::config::RepeatPolicy;

/// Electrical level of a pressed button (active-low).
pub const PRESSED_LEVEL: bool = false;

/// The five keypad buttons, in sampling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Button {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
    Select = 4,
}

impl Button {
    pub const COUNT: usize = 5;

    /// Stable sampling order.
    pub const ALL: [Button; Button::COUNT] =
        [Button::Left, Button::Right, Button::Up, Button::Down, Button::Select];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Per-button debounce record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    /// Raw level seen on the previous pass.
    pub previous_level: bool,
    /// Time of the last observed level change (ms, wrapping).
    pub last_transition_ms: u32,
    /// A press has already been reported for the current hold.
    reported: bool,
}

impl InputState {
    fn released(now_ms: u32) -> Self {
        Self {
            previous_level: !PRESSED_LEVEL,
            last_transition_ms: now_ms,
            reported: false,
        }
    }
}

pub struct ButtonSampler {
    states: [InputState; Button::COUNT],
    debounce_ms: u32,
    repeat: RepeatPolicy,
}

impl ButtonSampler {
    /// All buttons start released, with their window opened at `now_ms`.
    pub fn new(now_ms: u32, debounce_ms: u32, repeat: RepeatPolicy) -> Self {
        Self {
            states: [InputState::released(now_ms); Button::COUNT],
            debounce_ms,
            repeat,
        }
    }

    /// Feed one raw sample.  Returns `true` if this pass is a press.
    pub fn sample(&mut self, button: Button, raw_level: bool, now_ms: u32) -> bool {
        let st = &mut self.states[button.index()];

        if raw_level != st.previous_level {
            st.last_transition_ms = now_ms;
        }

        let settled = now_ms.wrapping_sub(st.last_transition_ms) > self.debounce_ms;
        let mut press = false;
        if settled {
            if raw_level == PRESSED_LEVEL {
                press = match self.repeat {
                    RepeatPolicy::Repeat => true,
                    RepeatPolicy::SinglePress => !st.reported,
                };
                st.reported = true;
            } else {
                st.reported = false;
            }
        }

        st.previous_level = raw_level;
        press
    }

    pub fn state(&self, button: Button) -> InputState {
        self.states[button.index()]
    }
}
