//! Per-probe calibration: read the probe once, let the operator edit the
//! value digit by digit, then hand it to the calibration collaborator.
//!
//! ```text
//!  line 1:  25.0          current value being edited
//!  line 2:   ⇕            digit cursor under the selected digit
//! ```
//!
//! LEFT / RIGHT move between digits (the decimal point and sign are
//! skipped, both ends clamp); UP / DOWN change the digit with 9 → 0 and
//! 0 → 9 wrap-around.

use log::{info, warn};

use super::glyphs::DOUBLE_ARROW;
use super::measure::{MEASURING, PROBE_ERROR};
use super::{Action, Bindings, Outcome, Screen, ScreenAction, ScreenContext, ScreenId};
use crate::app::events::AppEvent;
use crate::drivers::button::Button;
use crate::error::{Error, Field, Result};
use crate::sensors::channel::Channel;
use crate::sensors::protocol::parse_decimal;

pub const CALIBRATION_FAILED: &str = "Calibration failed";

/// Editable decimal text with a cursor on one of its digits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigitEditor {
    text: String,
    cursor: usize,
}

impl DigitEditor {
    /// Cursor starts on the first digit.
    pub fn new(text: &str) -> Self {
        let text = text.to_string();
        let cursor = text.bytes().position(|b| b.is_ascii_digit()).unwrap_or(0);
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the selected digit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        !self.text.bytes().any(|b| b.is_ascii_digit())
    }

    pub fn next_digit(&mut self) {
        let next = self.digit_positions().find(|&i| i > self.cursor);
        if let Some(i) = next {
            self.cursor = i;
        }
    }

    pub fn previous_digit(&mut self) {
        let prev = self.digit_positions().filter(|&i| i < self.cursor).last();
        if let Some(i) = prev {
            self.cursor = i;
        }
    }

    pub fn increase(&mut self) {
        self.step(1);
    }

    pub fn decrease(&mut self) {
        self.step(9);
    }

    fn step(&mut self, by: u8) {
        let Some(&b) = self.text.as_bytes().get(self.cursor) else {
            return;
        };
        if !b.is_ascii_digit() {
            return;
        }
        let digit = char::from(b'0' + (b - b'0' + by) % 10);
        let mut buf = [0u8; 4];
        self.text
            .replace_range(self.cursor..=self.cursor, digit.encode_utf8(&mut buf));
    }

    fn digit_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.text
            .bytes()
            .enumerate()
            .filter(|(_, b)| b.is_ascii_digit())
            .map(|(i, _)| i)
    }

    /// Cursor line: blanks up to the selected digit, then the cursor glyph.
    pub fn cursor_line(&self) -> String {
        let mut line = " ".repeat(self.cursor);
        line.push(DOUBLE_ARROW.as_char());
        line
    }
}

pub struct CalibrationScreen {
    id: ScreenId,
    channel: Channel,
    bindings: Bindings,
    editor: DigitEditor,
    ctx: ScreenContext,
}

impl CalibrationScreen {
    pub fn new(id: ScreenId, channel: Channel, ctx: ScreenContext) -> Self {
        let bindings = Bindings::new()
            .bind(Button::Left, Action::Screen(ScreenAction::PreviousDigit))
            .bind(Button::Right, Action::Screen(ScreenAction::NextDigit))
            .bind(Button::Up, Action::Screen(ScreenAction::IncreaseDigit))
            .bind(Button::Down, Action::Screen(ScreenAction::DecreaseDigit))
            .bind(Button::Select, Action::Screen(ScreenAction::Calibrate));
        Self {
            id,
            channel,
            bindings,
            editor: DigitEditor::default(),
            ctx,
        }
    }

    fn render(&self) -> Result<()> {
        let cursor = self.editor.cursor_line();
        self.ctx.display.show(&[self.editor.text(), cursor.as_str()])
    }

    fn field(&self) -> Field {
        match self.channel {
            Channel::Temperature => Field::Temperature,
            Channel::Conductivity => Field::Conductivity,
            Channel::Redox => Field::Redox,
        }
    }

    fn calibrate(&mut self) -> Result<Outcome> {
        if self.editor.is_empty() {
            warn!("{} calibration ignored: no probe value", self.channel);
            return Ok(Outcome::Stay);
        }
        let reference = parse_decimal(self.editor.text(), self.field())?;

        match self.ctx.calibrator.calibrate(self.channel, reference) {
            Ok(()) => {
                info!("{} calibrated at {}", self.channel, self.editor.text());
                self.ctx.emit(AppEvent::Calibrated {
                    channel: self.channel,
                    reference,
                });
                Ok(Outcome::TransitionTo(ScreenId::Welcome))
            }
            Err(error) => {
                warn!("{} calibration failed: {error}", self.channel);
                self.ctx.emit(AppEvent::CalibrationFailed {
                    channel: self.channel,
                    error,
                });
                let cursor = self.editor.cursor_line();
                self.ctx.display.show(&[CALIBRATION_FAILED, cursor.as_str()])?;
                Ok(Outcome::Stay)
            }
        }
    }
}

impl Screen for CalibrationScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn initialize(&mut self) -> Result<()> {
        self.ctx.display.show(&[MEASURING])?;

        let value = self.ctx.probes.lock().read_value(self.channel);
        match value {
            Ok(text) => {
                self.editor = DigitEditor::new(&text);
                self.render()
            }
            Err(Error::Protocol(e)) => {
                warn!("PROBE | {} read failed: {e}", self.channel);
                self.editor = DigitEditor::default();
                let reason = e.to_string();
                self.ctx.display.show(&[PROBE_ERROR, reason.as_str()])?;
                self.ctx.emit(AppEvent::ProtocolFault(e));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn handle(&mut self, action: ScreenAction) -> Result<Outcome> {
        if action == ScreenAction::Calibrate {
            return self.calibrate();
        }
        if self.editor.is_empty() {
            return Ok(Outcome::Stay);
        }
        match action {
            ScreenAction::PreviousDigit => self.editor.previous_digit(),
            ScreenAction::NextDigit => self.editor.next_digit(),
            ScreenAction::IncreaseDigit => self.editor.increase(),
            ScreenAction::DecreaseDigit => self.editor.decrease(),
            ScreenAction::Calibrate => {}
        }
        self.render()?;
        Ok(Outcome::Stay)
    }
}
