//! Probe channels and the 2-bit multiplexer address.
//!
//! The analog front end routes one probe at a time onto the shared UART
//! through a 4-way multiplexer driven by two select lines.  Channel numbers
//! are the meter's own logical numbering; the address on the lines is
//! `number - 1` with bit 0 on line B and bit 1 on line A.  Address 3 is
//! unused.
//!
//! | Channel      | Number | Address | A | B |
//! |--------------|--------|---------|---|---|
//! | Conductivity | 1      | 0       | 0 | 0 |
//! | Redox        | 2      | 1       | 0 | 1 |
//! | Temperature  | 3      | 2       | 1 | 0 |

use core::fmt;

/// One of the three probe lines behind the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Conductivity = 1,
    Redox = 2,
    Temperature = 3,
}

/// Levels for the two select lines (`true` = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectLevels {
    pub a: bool,
    pub b: bool,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Conductivity, Channel::Redox, Channel::Temperature];

    /// Logical channel number (1..=3).
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Multiplexer address (0-based).
    pub const fn address(self) -> u8 {
        self.number() - 1
    }

    /// Line levels for this channel.  Pure: no state is consulted.
    pub const fn levels(self) -> SelectLevels {
        let addr = self.address();
        SelectLevels {
            a: addr & 0b10 != 0,
            b: addr & 0b01 != 0,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conductivity => write!(f, "conductivity"),
            Self::Redox => write!(f, "redox"),
            Self::Temperature => write!(f, "temperature"),
        }
    }
}
