//! Screen table: one factory per [`ScreenId`], built once at startup.

use log::info;

use super::calibrate::CalibrationScreen;
use super::measure::MeasurementScreen;
use super::{menu, Screen, ScreenContext, ScreenId};
use crate::error::NavigationError;
use crate::sensors::channel::Channel;

/// Builds a fresh instance of a screen on transition-in.
pub type ScreenFactory = fn(&ScreenContext) -> Box<dyn Screen>;

/// One row of the table.
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub build: ScreenFactory,
}

/// Fixed-size table indexed by `ScreenId as usize`.
pub struct ScreenTable {
    rows: [ScreenDescriptor; ScreenId::COUNT],
}

impl ScreenTable {
    /// Check that every row sits at its own index.
    pub fn new(
        rows: [ScreenDescriptor; ScreenId::COUNT],
    ) -> Result<Self, NavigationError> {
        for (i, row) in rows.iter().enumerate() {
            if row.id.index() != i {
                return Err(NavigationError::TableMismatch(row.id));
            }
        }
        Ok(Self { rows })
    }

    pub fn build(&self, id: ScreenId, ctx: &ScreenContext) -> Box<dyn Screen> {
        (self.rows[id.index()].build)(ctx)
    }
}

/// Build the screen table.  Called once at startup.
pub fn build_screen_table() -> Result<ScreenTable, NavigationError> {
    let table = ScreenTable::new([
        ScreenDescriptor { id: ScreenId::Welcome, build: welcome },
        ScreenDescriptor { id: ScreenId::Measure, build: measure },
        ScreenDescriptor { id: ScreenId::ProbeSelect, build: probe_select },
        ScreenDescriptor { id: ScreenId::CalibrateTemperature, build: calibrate_temperature },
        ScreenDescriptor { id: ScreenId::CalibrateConductivity, build: calibrate_conductivity },
        ScreenDescriptor { id: ScreenId::CalibrateRedox, build: calibrate_redox },
    ])?;
    info!("Screen table ready ({} screens)", ScreenId::COUNT);
    Ok(table)
}

fn welcome(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(menu::welcome(ctx.display.clone(), ctx.visible_lines))
}

fn probe_select(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(menu::probe_select(ctx.display.clone(), ctx.visible_lines))
}

fn measure(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(MeasurementScreen::new(ctx.clone()))
}

fn calibrate_temperature(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(CalibrationScreen::new(ScreenId::CalibrateTemperature, Channel::Temperature, ctx.clone()))
}

fn calibrate_conductivity(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(CalibrationScreen::new(ScreenId::CalibrateConductivity, Channel::Conductivity, ctx.clone()))
}

fn calibrate_redox(ctx: &ScreenContext) -> Box<dyn Screen> {
    Box::new(CalibrationScreen::new(ScreenId::CalibrateRedox, Channel::Redox, ctx.clone()))
}
