//! One-shot hardware peripheral initialization.
//!
//! Claims the UART and the GPIOs listed in [`pins`](crate::pins), configures
//! directions and pull-ups, and hands back typed drivers wrapped in their
//! port adapters.  Called once from `main()` before the navigator starts.

use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_hal::sys::EspError;
use log::info;

use crate::adapters::hardware::{GpioButtons, GpioSelectLines};
use crate::adapters::serial::UartSerial;
use crate::config::ControllerConfig;
use crate::drivers::button::Button;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    PeripheralsTaken,
    GpioConfigFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PeripheralsTaken => write!(f, "peripherals already taken"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

fn gpio_err(e: EspError) -> HwInitError {
    HwInitError::GpioConfigFailed(e.code())
}

// ── Board ─────────────────────────────────────────────────────

pub type SelectPin = PinDriver<'static, AnyOutputPin, Output>;
pub type ButtonPin = PinDriver<'static, AnyInputPin, Input>;

/// Everything the controller drives directly.
pub struct Board {
    pub serial: UartSerial,
    pub select_lines: GpioSelectLines<SelectPin, SelectPin>,
    pub buttons: GpioButtons<ButtonPin>,
}

pub fn init_board(config: &ControllerConfig) -> Result<Board, HwInitError> {
    let peripherals = Peripherals::take().map_err(|_| HwInitError::PeripheralsTaken)?;

    // SAFETY: every GPIO number below is claimed exactly once, here, and
    // none of them is handed out through `peripherals.pins`.
    let (mux_a, mux_b, tx, rx, keys) = unsafe {
        (
            AnyOutputPin::new(pins::MUX_A_GPIO),
            AnyOutputPin::new(pins::MUX_B_GPIO),
            AnyIOPin::new(pins::PROBE_UART_TX_GPIO),
            AnyIOPin::new(pins::PROBE_UART_RX_GPIO),
            [
                AnyInputPin::new(pins::BUTTON_LEFT_GPIO),
                AnyInputPin::new(pins::BUTTON_RIGHT_GPIO),
                AnyInputPin::new(pins::BUTTON_UP_GPIO),
                AnyInputPin::new(pins::BUTTON_DOWN_GPIO),
                AnyInputPin::new(pins::BUTTON_SELECT_GPIO),
            ],
        )
    };

    // Multiplexer lines start at channel address 0.
    let mut a = PinDriver::output(mux_a).map_err(gpio_err)?;
    let mut b = PinDriver::output(mux_b).map_err(gpio_err)?;
    a.set_low().map_err(gpio_err)?;
    b.set_low().map_err(gpio_err)?;
    info!("hw_init: mux select lines on GPIO{}/GPIO{}", pins::MUX_A_GPIO, pins::MUX_B_GPIO);

    // Active-low keys with internal pull-ups.
    let mut buttons = Vec::with_capacity(keys.len());
    for key in keys {
        let mut pin = PinDriver::input(key).map_err(gpio_err)?;
        pin.set_pull(Pull::Up).map_err(gpio_err)?;
        buttons.push(pin);
    }
    let buttons: [ButtonPin; Button::COUNT] = buttons
        .try_into()
        .map_err(|_| HwInitError::GpioConfigFailed(-1))?;
    info!("hw_init: keypad configured");

    let uart_cfg = UartConfig::default().baudrate(Hertz(config.serial_baud));
    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_cfg,
    )
    .map_err(|e| HwInitError::UartInitFailed(e.code()))?;
    info!("hw_init: probe UART at {} baud", config.serial_baud);

    Ok(Board {
        serial: UartSerial::new(uart),
        select_lines: GpioSelectLines::new(a, b),
        buttons: GpioButtons::new(buttons),
    })
}
