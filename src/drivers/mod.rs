//! Input sampling, hardware initialisation, and task helpers.

pub mod button;
#[cfg(target_os = "espidf")]
pub mod hw_init;
pub mod task_pin;
