//! Log-backed character display.
//!
//! Stands in for the LCD until a panel driver is wired: every written
//! line goes to the log with the custom glyphs replaced by ASCII.

use log::{debug, info};

use crate::app::ports::Display;
use crate::error::IoError;
use crate::screens::glyphs::{DOUBLE_ARROW, RIGHT_ARROW};

#[derive(Default)]
pub struct LogDisplay {
    frame: Vec<String>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written since the last clear, glyphs already substituted.
    pub fn frame(&self) -> &[String] {
        &self.frame
    }
}

fn printable(c: char) -> char {
    match u8::try_from(c) {
        Ok(slot) if slot == RIGHT_ARROW.slot => '>',
        Ok(slot) if slot == DOUBLE_ARROW.slot => '^',
        Ok(0..=7) => '#',
        _ => c,
    }
}

impl Display for LogDisplay {
    fn clear(&mut self) -> Result<(), IoError> {
        self.frame.clear();
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<(), IoError> {
        let line: String = text.chars().map(printable).collect();
        info!("LCD | {}", line);
        self.frame.push(line);
        Ok(())
    }

    fn create_glyph(&mut self, slot: u8, bitmap: &[u8; 8]) -> Result<(), IoError> {
        debug!("LCD | glyph {} = {:02x?}", slot, bitmap);
        Ok(())
    }
}
