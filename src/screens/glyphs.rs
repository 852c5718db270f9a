//! Custom 5x8 glyphs for the character display.
//!
//! Each row is one byte; the low five bits are the pixels.  A glyph is
//! printed by writing the character whose code equals its slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub slot: u8,
    pub bitmap: [u8; 8],
}

impl Glyph {
    /// The character that prints this glyph.
    pub const fn as_char(self) -> char {
        self.slot as char
    }
}

/// Menu selection cursor (▶).
pub const RIGHT_ARROW: Glyph = Glyph {
    slot: 0,
    bitmap: [0x00, 0x08, 0x0C, 0x0E, 0x0C, 0x08, 0x00, 0x00],
};

/// Digit cursor (▲ over ▼).
pub const DOUBLE_ARROW: Glyph = Glyph {
    slot: 1,
    bitmap: [0x04, 0x0E, 0x1F, 0x00, 0x1F, 0x0E, 0x04, 0x00],
};

pub const ALL: [Glyph; 2] = [RIGHT_ARROW, DOUBLE_ARROW];
