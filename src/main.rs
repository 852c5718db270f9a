//! NH4+ Meter Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartSerial      GpioSelectLines   GpioButtons   LogDisplay    │
//! │  (SerialPort)    (SelectLines)     (ButtonInput) (Display)     │
//! │  LogEventSink    ConfigStore       MonotonicClock              │
//! │  (EventSink)     (ConfigPort)      (Clock)                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Navigator ─▶ Screens ─▶ ProbeLink                     │    │
//! │  │  ButtonSampler · BackgroundTask                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use nh4meter::adapters::display::LogDisplay;
use nh4meter::adapters::external::{LogCalibrator, NullPredictor};
use nh4meter::adapters::log_sink::LogEventSink;
use nh4meter::adapters::nvs::ConfigStore;
use nh4meter::adapters::time::MonotonicClock;
use nh4meter::app::ports::ConfigPort;
use nh4meter::config::ControllerConfig;
use nh4meter::drivers::hw_init;
use nh4meter::nav::Navigator;
use nh4meter::screens::{build_screen_table, DisplayHandle, ScreenContext, ScreenId};
use nh4meter::sensors::{ProbeHandle, ProbeLink};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  NH4+ meter v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match ConfigStore::new().map(|store| store.load()) {
        Ok(Ok(cfg)) => cfg,
        Ok(Err(e)) => {
            warn!("Stored config rejected ({}), using defaults", e);
            ControllerConfig::default()
        }
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            ControllerConfig::default()
        }
    };
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config: not printable ({})", e),
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let board = hw_init::init_board(&config).context("peripheral bring-up")?;

    // ── 4. Shared collaborators ───────────────────────────────
    let probes = ProbeHandle::new(ProbeLink::new(
        Box::new(board.serial),
        Box::new(board.select_lines),
        &config,
    ));
    let ctx = ScreenContext {
        display: DisplayHandle::new(Box::new(LogDisplay::new())),
        probes,
        predictor: Arc::new(NullPredictor),
        calibrator: Arc::new(LogCalibrator),
        sink: Arc::new(LogEventSink::new()),
        visible_lines: config.visible_lines.into(),
    };

    // ── 5. Navigator ──────────────────────────────────────────
    let table = build_screen_table().context("screen table")?;
    let mut navigator = Navigator::new(table, ctx, board.buttons, MonotonicClock::new(), &config);
    navigator.start(ScreenId::Welcome).context("start")?;

    info!("System ready. Entering input loop.");
    navigator.run().context("input loop")?;
    Ok(())
}
