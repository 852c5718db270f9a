//! Line codec and response parsers for the probe circuits.
//!
//! ```text
//!  request : <ascii>\r        "R\r"  or  "25.0C\r"
//!  response: <ascii>\r        "25.0\r", "1413,1.0,0\r", "200.0\r"
//! ```
//!
//! Responses are accumulated byte by byte in a fixed buffer; nothing is
//! returned until the carriage return arrives.

use heapless::{String, Vec};

use crate::error::{Field, ProtocolError};

/// Line terminator for requests and responses.
pub const TERMINATOR: u8 = b'\r';

/// Longest accepted response, terminator excluded.
pub const MAX_RESPONSE_LEN: usize = 32;

/// Plain read request.
pub const READ: &str = "R";

/// Number of fields in a conductivity response (EC, TDS, salinity).
pub const CONDUCTIVITY_FIELDS: usize = 3;

/// A complete response line, terminator stripped.
pub type Response = String<MAX_RESPONSE_LEN>;

/// An outgoing request line, terminator excluded.
pub type Request = String<{ MAX_RESPONSE_LEN + 8 }>;

/// Temperature-compensated read request: `"{temperature}C"`.
pub fn compensated_read(temperature_raw: &str) -> Result<Request, ProtocolError> {
    let mut req = Request::new();
    req.push_str(temperature_raw)
        .map_err(|()| ProtocolError::ResponseTooLong)?;
    req.push('C').map_err(|()| ProtocolError::ResponseTooLong)?;
    Ok(req)
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Incremental response accumulator.
#[derive(Default)]
pub struct LineReader {
    buf: Vec<u8, MAX_RESPONSE_LEN>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns the completed line when `byte` is the
    /// terminator.
    pub fn push(&mut self, byte: u8) -> Result<Option<Response>, ProtocolError> {
        if byte != TERMINATOR {
            self.buf
                .push(byte)
                .map_err(|_| ProtocolError::ResponseTooLong)?;
            return Ok(None);
        }

        let text = core::str::from_utf8(&self.buf).map_err(|_| ProtocolError::NotText)?;
        let mut line = Response::new();
        // Capacity matches the byte buffer, so this cannot overflow.
        let _ = line.push_str(text);
        self.buf.clear();
        Ok(Some(line))
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Finite decimal reading (temperature °C, redox mV).
pub fn parse_decimal(text: &str, field: Field) -> Result<f32, ProtocolError> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ProtocolError::NonNumeric(field))
}

/// Conductivity from an `"EC,TDS,SAL"` triple.  Only the first field is
/// used; the other two must be present.
pub fn parse_conductivity(text: &str) -> Result<u32, ProtocolError> {
    let ec = conductivity_field(text)?;
    ec.parse::<u32>()
        .map_err(|_| ProtocolError::NonNumeric(Field::Conductivity))
}

/// First field of a conductivity triple, as text.
pub fn conductivity_field(text: &str) -> Result<&str, ProtocolError> {
    let text = text.trim();
    let found = text.split(',').count();
    if found != CONDUCTIVITY_FIELDS {
        return Err(ProtocolError::FieldCount {
            expected: CONDUCTIVITY_FIELDS,
            found,
        });
    }
    Ok(text.split(',').next().unwrap_or_default())
}
