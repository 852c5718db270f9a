//! Application boundary: port traits and outbound events.
//!
//! Everything the controller needs from the outside world goes through a
//! trait in [`ports`], keeping the sampler, probe protocol, screens and
//! navigator fully testable without real peripherals.

pub mod events;
pub mod ports;
