//! Continuous NH4+ measurement screen.

use std::sync::Arc;

use log::warn;

use super::{Action, Bindings, DisplayHandle, Screen, ScreenContext, ScreenId, Update};
use crate::app::events::{AppEvent, MeasurementData};
use crate::app::ports::{EventSink, Predictor};
use crate::drivers::button::Button;
use crate::error::{Error, Result};
use crate::sensors::{ProbeHandle, Reading};

pub const MEASURING: &str = "Measuring...";
pub const PROBE_ERROR: &str = "Probe error";

pub struct MeasurementScreen {
    bindings: Bindings,
    ctx: ScreenContext,
}

impl MeasurementScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            bindings: Bindings::new().bind(Button::Left, Action::TransitionTo(ScreenId::Welcome)),
            ctx,
        }
    }
}

impl Screen for MeasurementScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Measure
    }

    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn initialize(&mut self) -> Result<()> {
        self.ctx.display.show(&[MEASURING])
    }

    fn updater(&self) -> Option<Box<dyn Update>> {
        Some(Box::new(MeasurementJob {
            probes: self.ctx.probes.clone(),
            display: self.ctx.display.clone(),
            predictor: Arc::clone(&self.ctx.predictor),
            sink: Arc::clone(&self.ctx.sink),
        }))
    }
}

/// One measurement cycle per step: read the three probes, predict,
/// render.
pub struct MeasurementJob {
    probes: ProbeHandle,
    display: DisplayHandle,
    predictor: Arc<dyn Predictor>,
    sink: Arc<dyn EventSink>,
}

impl MeasurementJob {
    fn render(&self, reading: &Reading, nh4: Option<f32>) -> Result<()> {
        let first = match nh4 {
            Some(v) => format!("NH4+ (mg/l): {v:.2}"),
            None => "NH4+ (mg/l): --".to_string(),
        };
        let second = format!(
            "Temp (C): {} - EC (mS/cm): {}",
            reading.temperature_raw, reading.conductivity
        );
        self.display.show(&[first.as_str(), second.as_str()])
    }
}

impl Update for MeasurementJob {
    fn step(&mut self) -> Result<()> {
        // Probe lock is released before rendering.
        let result = self.probes.lock().measure();

        match result {
            Ok(reading) => {
                let nh4 = self
                    .predictor
                    .predict(reading.temperature, reading.conductivity, reading.redox);
                self.render(&reading, nh4)?;
                self.sink.emit(&AppEvent::Measurement(MeasurementData {
                    temperature_c: reading.temperature,
                    conductivity_us_cm: reading.conductivity,
                    redox_mv: reading.redox,
                    nh4_mg_l: nh4,
                }));
                Ok(())
            }
            Err(Error::Protocol(e)) => {
                warn!("PROBE | cycle aborted: {e}");
                let reason = e.to_string();
                self.display.show(&[PROBE_ERROR, reason.as_str()])?;
                self.sink.emit(&AppEvent::ProtocolFault(e));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
