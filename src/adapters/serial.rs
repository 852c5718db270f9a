//! UART adapter for the probe link (38400 8N1, CR-terminated ASCII).
//!
//! ESP-IDF only; host tests drive [`ProbeLink`](crate::sensors::ProbeLink)
//! through scripted fakes instead.

use std::time::Duration;

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use log::error;

use crate::app::ports::SerialPort;
use crate::error::IoError;

pub struct UartSerial {
    uart: UartDriver<'static>,
}

impl UartSerial {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl SerialPort for UartSerial {
    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), IoError> {
        while !bytes.is_empty() {
            let n = self.uart.write(bytes).map_err(|e| {
                error!("UART | write failed: {e}");
                IoError::Serial
            })?;
            bytes = &bytes[n..];
        }
        Ok(())
    }

    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<Option<u8>, IoError> {
        let mut byte = [0u8; 1];
        let ticks = TickType::from(timeout).ticks();
        match self.uart.read(&mut byte, ticks) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) => {
                error!("UART | read failed: {e}");
                Err(IoError::Serial)
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), IoError> {
        self.uart.clear_rx().map_err(|e| {
            error!("UART | rx flush failed: {e}");
            IoError::Serial
        })
    }
}
