//! Unified error types for the NH4+ meter controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! navigator and `main` handle failures uniformly.  All variants are
//! `Copy` so they can be handed across the background-task boundary and
//! into events without allocation.

use core::fmt;

use crate::sensors::channel::Channel;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A probe response could not be read or parsed.
    Protocol(ProtocolError),
    /// An action or screen lookup is inconsistent with the screen table.
    Navigation(NavigationError),
    /// A serial, GPIO or display operation failed.
    Io(IoError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Navigation(e) => write!(f, "navigation: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Which part of a probe exchange a protocol error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Conductivity,
    Redox,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Conductivity => write!(f, "conductivity"),
            Self::Redox => write!(f, "redox"),
        }
    }
}

/// Malformed or missing probe responses.  Always aborts the current
/// measurement cycle; never replaced with placeholder values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The field is not a finite decimal number.
    NonNumeric(Field),
    /// The comma-separated response had the wrong number of fields.
    FieldCount { expected: usize, found: usize },
    /// Response bytes are not valid UTF-8.
    NotText,
    /// No carriage return within the response buffer capacity.
    ResponseTooLong,
    /// The probe on this channel did not answer within the read timeout,
    /// after all retries.
    Timeout(Channel),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonNumeric(field) => write!(f, "{field} is not a number"),
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, got {found}")
            }
            Self::NotText => write!(f, "response is not text"),
            Self::ResponseTooLong => write!(f, "response too long"),
            Self::Timeout(ch) => write!(f, "{ch} probe timed out"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Navigation errors
// ---------------------------------------------------------------------------

/// Programming / configuration defects in the screen table or bindings.
/// These are meant to fail loudly rather than be masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    /// The current screen has no action bound to this button.
    UnboundButton(crate::drivers::button::Button),
    /// The bound action is not supported by the current screen.
    UnsupportedAction(crate::screens::ScreenId),
    /// No screen is active yet (`start` was not called).
    NoActiveScreen,
    /// The screen name does not match any registered screen.
    UnknownScreen,
    /// A screen table row is not stored at its own index.
    TableMismatch(crate::screens::ScreenId),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundButton(b) => write!(f, "no action bound to {b:?}"),
            Self::UnsupportedAction(id) => write!(f, "action not supported by {}", id.name()),
            Self::NoActiveScreen => write!(f, "no active screen"),
            Self::UnknownScreen => write!(f, "unknown screen name"),
            Self::TableMismatch(id) => write!(f, "screen table row for {} misplaced", id.name()),
        }
    }
}

impl From<NavigationError> for Error {
    fn from(e: NavigationError) -> Self {
        Self::Navigation(e)
    }
}

// ---------------------------------------------------------------------------
// I/O errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// UART read or write failed.
    Serial,
    /// A select line or button pin could not be driven / read.
    Gpio,
    /// The display rejected a write.
    Display,
    /// The background task thread could not be spawned.
    Spawn,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial link failed"),
            Self::Gpio => write!(f, "GPIO access failed"),
            Self::Display => write!(f, "display write failed"),
            Self::Spawn => write!(f, "task spawn failed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
