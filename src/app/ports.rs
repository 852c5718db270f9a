//! Port traits — the hexagonal boundary between controller logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ProbeLink / Screens / Navigator
//! ```
//!
//! Driven adapters (serial link, select lines, buttons, display, storage)
//! and the two external collaborators (prediction, calibration) implement
//! these traits.  Nothing above this layer touches hardware directly.
//!
//! Ports that are reached from the background task are `Send`; the
//! collaborators are shared between screens and therefore `Send + Sync`.

use core::time::Duration;

use crate::config::ControllerConfig;
use crate::drivers::button::Button;
use crate::error::{IoError, Result};
use crate::sensors::channel::Channel;

// ───────────────────────────────────────────────────────────────
// Probe link ports (driven adapters: domain ↔ UART / GPIO)
// ───────────────────────────────────────────────────────────────

/// Byte-level serial link to the probe multiplexer.
pub trait SerialPort: Send {
    /// Write every byte of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> core::result::Result<(), IoError>;

    /// Read one byte.  `timeout = None` blocks until a byte arrives;
    /// otherwise `Ok(None)` means the timeout elapsed with nothing read.
    fn read_byte(&mut self, timeout: Option<Duration>)
    -> core::result::Result<Option<u8>, IoError>;

    /// Drop everything already received and not yet read.
    fn discard_input(&mut self) -> core::result::Result<(), IoError>;
}

/// The two multiplexer select outputs.
pub trait SelectLines: Send {
    /// Drive line A and line B (`true` = high).
    fn set_levels(&mut self, a: bool, b: bool) -> core::result::Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Operator interface ports
// ───────────────────────────────────────────────────────────────

/// Raw keypad levels, read once per sampling pass.
pub trait ButtonInput {
    /// Electrical level of `button` (`true` = high).
    fn level(&mut self, button: Button) -> core::result::Result<bool, IoError>;
}

/// Character display.
pub trait Display: Send {
    fn clear(&mut self) -> core::result::Result<(), IoError>;

    /// Append one text line below the previous one.  Glyph slots are
    /// addressed with the characters `'\x00'`..`'\x07'`.
    fn write_line(&mut self, text: &str) -> core::result::Result<(), IoError>;

    /// Program a custom 5x8 glyph into `slot`.
    fn create_glyph(&mut self, slot: u8, bitmap: &[u8; 8]) -> core::result::Result<(), IoError>;
}

/// Monotonic millisecond clock for the sampler (wraps at `u32::MAX`).
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// External collaborators
// ───────────────────────────────────────────────────────────────

/// Ammonium estimate from one full probe reading.  Called exactly once
/// per measurement cycle; `None` means no estimate is available.
pub trait Predictor: Send + Sync {
    fn predict(&self, temperature: f32, conductivity: u32, redox: f32) -> Option<f32>;
}

/// Probe calibration against an operator-entered reference value.
pub trait Calibrator: Send + Sync {
    fn calibrate(&self, channel: Channel, reference: f32) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port, from both the foreground loop and the background
/// task.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> core::result::Result<ControllerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ControllerConfig) -> core::result::Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed to decode.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
