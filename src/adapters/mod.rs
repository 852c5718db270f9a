//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements               | Connects to                 |
//! |------------|--------------------------|-----------------------------|
//! | `display`  | Display                  | Serial log (LCD stand-in)   |
//! | `external` | Predictor, Calibrator    | Log-only placeholders       |
//! | `hardware` | SelectLines, ButtonInput | `embedded-hal` GPIO pins    |
//! | `log_sink` | EventSink                | Serial log output           |
//! | `nvs`      | ConfigPort               | NVS / in-memory store       |
//! | `serial`   | SerialPort               | ESP-IDF UART driver         |
//! | `time`     | Clock                    | ESP32 system timer          |

pub mod display;
pub mod external;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
#[cfg(target_os = "espidf")]
pub mod serial;
pub mod time;
