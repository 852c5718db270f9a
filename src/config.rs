//! Controller configuration parameters
//!
//! All tunable timing and policy parameters for the meter.
//! Values can be overridden via NVS (see [`crate::adapters::nvs`]).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the sampler does while a button stays pressed past the
/// debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatPolicy {
    /// Report a press on every sampling pass while held (key repeat).
    Repeat,
    /// Report once per settled press; re-armed on release.
    SinglePress,
}

/// How a screen transition waits for the old background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinPolicy {
    /// Wait until the task has stopped, warning every `join_timeout_ms`.
    Hard,
    /// Wait at most `join_timeout_ms`, then detach the task and proceed.
    BestEffort,
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Input ---
    /// Minimum time a button level must hold before it is trusted.
    pub debounce_ms: u32,
    /// Held-button behaviour.
    pub repeat_policy: RepeatPolicy,
    /// Spacing between foreground sampling passes.
    pub poll_interval_ms: u32,

    // --- Background task ---
    /// Pause between two measurement cycles (0 = back-to-back).
    pub update_interval_ms: u32,
    /// Join behaviour on transition.
    pub join_policy: JoinPolicy,
    /// Join wait (best effort) or warning period (hard).
    pub join_timeout_ms: u32,

    // --- Probe link ---
    /// Per-response read timeout. `None` blocks until a CR arrives.
    pub read_timeout_ms: Option<u32>,
    /// Extra request attempts after a read timeout.
    pub read_retries: u8,
    /// UART baud rate of the probe link.
    pub serial_baud: u32,

    // --- Display ---
    /// Text lines visible at once (menu window height).
    pub visible_lines: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Input
            debounce_ms: 100,
            repeat_policy: RepeatPolicy::Repeat,
            poll_interval_ms: 100,

            // Background task
            update_interval_ms: 0,
            join_policy: JoinPolicy::Hard,
            join_timeout_ms: 10_000,

            // Probe link
            read_timeout_ms: Some(2_000),
            read_retries: 2,
            serial_baud: 38_400,

            // Display (16x2 character LCD)
            visible_lines: 2,
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if !(10..=1_000).contains(&self.debounce_ms) {
            return Err(Error::Config("debounce_ms must be 10–1000"));
        }
        if !(1..=1_000).contains(&self.poll_interval_ms) {
            return Err(Error::Config("poll_interval_ms must be 1–1000"));
        }
        if self.update_interval_ms > 60_000 {
            return Err(Error::Config("update_interval_ms must be 0–60000"));
        }
        if !(100..=60_000).contains(&self.join_timeout_ms) {
            return Err(Error::Config("join_timeout_ms must be 100–60000"));
        }
        if let Some(ms) = self.read_timeout_ms {
            if !(50..=60_000).contains(&ms) {
                return Err(Error::Config("read_timeout_ms must be 50–60000"));
            }
        }
        if self.read_retries > 5 {
            return Err(Error::Config("read_retries must be 0–5"));
        }
        if !(1_200..=115_200).contains(&self.serial_baud) {
            return Err(Error::Config("serial_baud must be 1200–115200"));
        }
        if !(1..=4).contains(&self.visible_lines) {
            return Err(Error::Config("visible_lines must be 1–4"));
        }
        Ok(())
    }

    /// Encode as a compact blob for NVS.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("config encode failed"))
    }

    /// Decode and validate a blob read back from NVS.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cfg: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("config blob corrupted"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
