//! GPIO adapters bridging `embedded-hal` pins to the port traits.
//!
//! Generic over the HAL pin types, so the same code drives ESP-IDF
//! `PinDriver`s on the board and mock pins in tests.

use embedded_hal::digital::{InputPin, OutputPin};
use log::error;

use crate::app::ports::{ButtonInput, SelectLines};
use crate::drivers::button::Button;
use crate::error::IoError;

/// Multiplexer select lines A and B.
pub struct GpioSelectLines<A: OutputPin, B: OutputPin> {
    a: A,
    b: B,
}

impl<A: OutputPin, B: OutputPin> GpioSelectLines<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), IoError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| {
        error!("GPIO | select line write failed: {e:?}");
        IoError::Gpio
    })
}

impl<A, B> SelectLines for GpioSelectLines<A, B>
where
    A: OutputPin + Send,
    B: OutputPin + Send,
{
    fn set_levels(&mut self, a: bool, b: bool) -> Result<(), IoError> {
        drive(&mut self.a, a)?;
        drive(&mut self.b, b)
    }
}

/// The five keypad inputs, indexed by [`Button::index`].
pub struct GpioButtons<P: InputPin> {
    pins: [P; Button::COUNT],
}

impl<P: InputPin> GpioButtons<P> {
    /// `pins` in sampling order: LEFT, RIGHT, UP, DOWN, SELECT.
    pub fn new(pins: [P; Button::COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> ButtonInput for GpioButtons<P> {
    fn level(&mut self, button: Button) -> Result<bool, IoError> {
        self.pins[button.index()].is_high().map_err(|e| {
            error!("GPIO | {button:?} read failed: {e:?}");
            IoError::Gpio
        })
    }
}
