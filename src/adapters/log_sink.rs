//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Started(screen) => {
                info!("NAV | started on {}", screen);
            }
            AppEvent::ScreenChanged { from, to } => match from {
                Some(from) => info!("NAV | {} -> {}", from, to),
                None => info!("NAV | -> {}", to),
            },
            AppEvent::TaskStopped { screen } => {
                info!("TASK | {} update stopped", screen);
            }
            AppEvent::TaskJoinTimedOut { screen } => {
                warn!("TASK | {} update detached after join timeout", screen);
            }
            AppEvent::Measurement(m) => {
                info!(
                    "PROBE | T={:.1}\u{00b0}C | EC={}uS/cm | ORP={:.1}mV | NH4+={}",
                    m.temperature_c,
                    m.conductivity_us_cm,
                    m.redox_mv,
                    match m.nh4_mg_l {
                        Some(v) => format!("{:.2}mg/l", v),
                        None => "--".to_string(),
                    },
                );
            }
            AppEvent::ProtocolFault(e) => {
                warn!("PROBE | fault: {}", e);
            }
            AppEvent::Calibrated { channel, reference } => {
                info!("PROBE | {} calibrated to {}", channel, reference);
            }
            AppEvent::CalibrationFailed { channel, error } => {
                warn!("PROBE | {} calibration failed: {}", channel, error);
            }
        }
    }
}
