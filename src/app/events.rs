//! Outbound application events.
//!
//! The navigator and the screens emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the default one logs to serial.

use crate::error::{Error, ProtocolError};
use crate::screens::ScreenId;
use crate::sensors::channel::Channel;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The navigator activated its first screen.
    Started(ScreenId),

    /// The active screen was replaced.
    ScreenChanged { from: Option<ScreenId>, to: ScreenId },

    /// A background task acknowledged cancellation and exited.
    TaskStopped { screen: ScreenId },

    /// A background task did not stop within the join timeout and was
    /// detached (best-effort join only).
    TaskJoinTimedOut { screen: ScreenId },

    /// One completed measurement cycle.
    Measurement(MeasurementData),

    /// A probe exchange failed; the cycle was aborted.
    ProtocolFault(ProtocolError),

    /// The calibration collaborator accepted a reference value.
    Calibrated { channel: Channel, reference: f32 },

    /// The calibration collaborator rejected a reference value.
    CalibrationFailed { channel: Channel, error: Error },
}

/// A point-in-time measurement suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementData {
    pub temperature_c: f32,
    pub conductivity_us_cm: u32,
    pub redox_mv: f32,
    pub nh4_mg_l: Option<f32>,
}
