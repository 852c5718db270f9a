//! Probe subsystem: multiplexed serial link to the three probe circuits.
//!
//! [`ProbeLink`] owns the UART and the two select lines and performs one
//! exchange at a time: select a channel, send a request line, read one
//! response line.  [`ProbeHandle`] shares it between the foreground loop
//! (calibration reads) and the measurement task.
//!
//! ## Measurement cycle
//!
//! | Step | Channel      | Request              | Response        |
//! |------|--------------|----------------------|-----------------|
//! | 1    | Temperature  | `R`                  | `25.0`          |
//! | 2    | Conductivity | `{temperature_raw}C` | `1413,1.0,0`    |
//! | 3    | Redox        | `R`                  | `200.0`         |
//!
//! Any parse failure aborts the cycle; no partial reading is returned.

pub mod channel;
pub mod protocol;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::ports::{SelectLines, SerialPort};
use crate::config::ControllerConfig;
use crate::error::{Field, ProtocolError, Result};
use channel::Channel;
use protocol::{LineReader, Response, READ, TERMINATOR};

/// One complete probe sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Temperature exactly as the probe sent it; echoed back to the
    /// conductivity circuit for compensation.
    pub temperature_raw: Response,
    pub temperature: f32,
    pub conductivity: u32,
    pub redox: f32,
}

pub struct ProbeLink {
    serial: Box<dyn SerialPort>,
    lines: Box<dyn SelectLines>,
    reader: LineReader,
    read_timeout: Option<Duration>,
    retries: u8,
}

impl ProbeLink {
    pub fn new(
        serial: Box<dyn SerialPort>,
        lines: Box<dyn SelectLines>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            serial,
            lines,
            reader: LineReader::new(),
            read_timeout: config.read_timeout_ms.map(|ms| Duration::from_millis(ms.into())),
            retries: config.read_retries,
        }
    }

    /// Route `channel` onto the UART.
    pub fn select_channel(&mut self, channel: Channel) -> Result<()> {
        let levels = channel.levels();
        self.lines.set_levels(levels.a, levels.b)?;
        Ok(())
    }

    /// Write `request` followed by the terminator.
    pub fn send_request(&mut self, request: &str) -> Result<()> {
        self.serial.write_all(request.as_bytes())?;
        self.serial.write_all(&[TERMINATOR])?;
        Ok(())
    }

    /// Read one response line.  Returns `Ok(None)` if the read timeout
    /// elapsed before the terminator; never returns a partial line.
    pub fn read_response(&mut self) -> Result<Option<Response>> {
        self.reader.reset();
        let deadline = self.read_timeout.map(|t| Instant::now() + t);

        loop {
            let remaining = match deadline {
                Some(d) => match d.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => return Ok(None),
                },
                None => None,
            };

            let Some(byte) = self.serial.read_byte(remaining)? else {
                return Ok(None);
            };

            match self.reader.push(byte) {
                Ok(Some(line)) => return Ok(Some(line)),
                Ok(None) => {}
                Err(ProtocolError::ResponseTooLong) => {
                    self.discard_line(deadline)?;
                    return Err(ProtocolError::ResponseTooLong.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drop bytes up to the next terminator so the following exchange
    /// starts on a line boundary.
    fn discard_line(&mut self, deadline: Option<Instant>) -> Result<()> {
        self.reader.reset();
        loop {
            let remaining = match deadline {
                Some(d) => match d.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => return Ok(()),
                },
                None => None,
            };
            match self.serial.read_byte(remaining)? {
                Some(TERMINATOR) | None => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Select, send and read as one unit, re-sending the request after a
    /// read timeout up to the configured number of retries.
    ///
    /// Pending input is dropped before every send, so a reply that arrived
    /// after an earlier timeout is never taken for the answer to this one.
    pub fn transact(&mut self, channel: Channel, request: &str) -> Result<Response> {
        self.select_channel(channel)?;
        let attempts = u32::from(self.retries) + 1;
        for attempt in 1..=attempts {
            self.serial.discard_input()?;
            self.send_request(request)?;
            if let Some(line) = self.read_response()? {
                debug!("PROBE | {channel} {request:?} -> {:?}", line.as_str());
                return Ok(line);
            }
            warn!("PROBE | {channel} timed out (attempt {attempt}/{attempts})");
        }
        Err(ProtocolError::Timeout(channel).into())
    }

    /// Run one full temperature / conductivity / redox cycle.
    pub fn measure(&mut self) -> Result<Reading> {
        let temperature_raw = self.transact(Channel::Temperature, READ)?;
        let temperature = protocol::parse_decimal(&temperature_raw, Field::Temperature)?;

        let request = protocol::compensated_read(&temperature_raw)?;
        let ec = self.transact(Channel::Conductivity, &request)?;
        let conductivity = protocol::parse_conductivity(&ec)?;

        let redox_raw = self.transact(Channel::Redox, READ)?;
        let redox = protocol::parse_decimal(&redox_raw, Field::Redox)?;

        Ok(Reading {
            temperature_raw,
            temperature,
            conductivity,
            redox,
        })
    }

    /// Single uncompensated read of one probe, as validated decimal text.
    /// For conductivity only the first field of the triple is kept.
    pub fn read_value(&mut self, channel: Channel) -> Result<Response> {
        let line = self.transact(channel, READ)?;
        let (text, field) = match channel {
            Channel::Temperature => (line.trim(), Field::Temperature),
            Channel::Conductivity => (protocol::conductivity_field(&line)?, Field::Conductivity),
            Channel::Redox => (line.trim(), Field::Redox),
        };
        protocol::parse_decimal(text, field)?;

        let mut value = Response::new();
        // `text` is a slice of a Response, so it always fits.
        let _ = value.push_str(text);
        Ok(value)
    }
}

/// Shared, clonable access to the probe link.
#[derive(Clone)]
pub struct ProbeHandle(Arc<Mutex<ProbeLink>>);

impl ProbeHandle {
    pub fn new(link: ProbeLink) -> Self {
        Self(Arc::new(Mutex::new(link)))
    }

    /// Exclusive access for one exchange or cycle.  A panic in a previous
    /// holder does not leave the link in a torn state, so poisoning is
    /// ignored.
    pub fn lock(&self) -> MutexGuard<'_, ProbeLink> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
