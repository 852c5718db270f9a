//! Placeholder collaborators for the prediction formula and the probe
//! calibration routine, which live outside this firmware.

use log::info;

use crate::app::ports::{Calibrator, Predictor};
use crate::error::Result;
use crate::sensors::channel::Channel;

/// No prediction model is installed; every cycle reports `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPredictor;

impl Predictor for NullPredictor {
    fn predict(&self, _temperature: f32, _conductivity: u32, _redox: f32) -> Option<f32> {
        None
    }
}

/// Accepts every calibration request and only logs it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCalibrator;

impl Calibrator for LogCalibrator {
    fn calibrate(&self, channel: Channel, reference: f32) -> Result<()> {
        info!(
            "CAL | {} (channel {}) reference {}",
            channel,
            channel.number(),
            reference
        );
        Ok(())
    }
}
