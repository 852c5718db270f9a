//! GPIO / peripheral pin assignments for the meter main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Probe multiplexer (2-bit channel address)
// ---------------------------------------------------------------------------

/// Select line A (address bit 1).
pub const MUX_A_GPIO: i32 = 7;
/// Select line B (address bit 0).
pub const MUX_B_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Probe UART (EZO-style circuits, CR-terminated ASCII)
// ---------------------------------------------------------------------------

pub const PROBE_UART_TX_GPIO: i32 = 17;
pub const PROBE_UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Keypad (active-low with internal pull-ups)
// ---------------------------------------------------------------------------

pub const BUTTON_LEFT_GPIO: i32 = 4;
pub const BUTTON_RIGHT_GPIO: i32 = 5;
pub const BUTTON_UP_GPIO: i32 = 6;
pub const BUTTON_DOWN_GPIO: i32 = 15;
pub const BUTTON_SELECT_GPIO: i32 = 16;
