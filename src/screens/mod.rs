//! Screen model: what the operator sees and what each button does.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ScreenTable (indexed by ScreenId)                           │
//! │  ┌──────────────────────┬──────────────┬──────────────────┐  │
//! │  │ ScreenId             │ kind         │ background task  │  │
//! │  ├──────────────────────┼──────────────┼──────────────────┤  │
//! │  │ Welcome              │ menu         │ -                │  │
//! │  │ Measure              │ measurement  │ MeasurementJob   │  │
//! │  │ ProbeSelect          │ menu         │ -                │  │
//! │  │ Calibrate{T,EC,ORP}  │ calibration  │ -                │  │
//! │  └──────────────────────┴──────────────┴──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A screen never acts on a button by itself.  It publishes a
//! [`Bindings`] map from button to [`Action`]; the navigator resolves the
//! action at dispatch time and either performs it (transitions, menu
//! moves) or hands a [`ScreenAction`] back to the screen.

pub mod calibrate;
pub mod glyphs;
pub mod measure;
pub mod menu;
pub mod table;

use core::fmt;
use core::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::events::AppEvent;
use crate::app::ports::{Calibrator, Display, EventSink, Predictor};
use crate::drivers::button::Button;
use crate::error::{NavigationError, Result};
use crate::sensors::ProbeHandle;

pub use menu::{MenuItem, MenuScreen};
pub use table::{build_screen_table, ScreenDescriptor, ScreenTable};

// ---------------------------------------------------------------------------
// Screen identity
// ---------------------------------------------------------------------------

/// Every registered screen.
/// Must stay in sync with the table built in [`table::build_screen_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScreenId {
    Welcome = 0,
    Measure = 1,
    ProbeSelect = 2,
    CalibrateTemperature = 3,
    CalibrateConductivity = 4,
    CalibrateRedox = 5,
}

impl ScreenId {
    /// Total number of screens, used to size the table array.
    pub const COUNT: usize = 6;

    pub const ALL: [ScreenId; ScreenId::COUNT] = [
        ScreenId::Welcome,
        ScreenId::Measure,
        ScreenId::ProbeSelect,
        ScreenId::CalibrateTemperature,
        ScreenId::CalibrateConductivity,
        ScreenId::CalibrateRedox,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Measure => "measure",
            Self::ProbeSelect => "calibrate",
            Self::CalibrateTemperature => "temperature",
            Self::CalibrateConductivity => "ec",
            Self::CalibrateRedox => "orp",
        }
    }

    pub fn from_name(name: &str) -> core::result::Result<Self, NavigationError> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or(NavigationError::UnknownScreen)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenId {
    type Err = NavigationError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Operation bound to a button.  Resolved by the navigator on each press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TransitionTo(ScreenId),
    /// Go to the target of the current menu selection.
    TransitionToSelected,
    SelectNextItem,
    SelectPreviousItem,
    /// Forwarded to the current screen.
    Screen(ScreenAction),
}

/// Actions a screen handles on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    PreviousDigit,
    NextDigit,
    IncreaseDigit,
    DecreaseDigit,
    Calibrate,
}

/// What the navigator should do after a screen handled an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    TransitionTo(ScreenId),
}

/// Button → action map of one screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings([Option<Action>; Button::COUNT]);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, button: Button, action: Action) -> Self {
        self.0[button.index()] = Some(action);
        self
    }

    /// Bound buttons, in sampling order.
    pub fn buttons(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.0[b.index()].is_some())
    }

    pub fn action(&self, button: Button) -> core::result::Result<Action, NavigationError> {
        self.0[button.index()].ok_or(NavigationError::UnboundButton(button))
    }
}

// ---------------------------------------------------------------------------
// Screen trait
// ---------------------------------------------------------------------------

/// One step of a screen's continuous update.  The navigator repeats it on
/// a background thread until the screen is left.
pub trait Update: Send {
    fn step(&mut self) -> Result<()>;
}

pub trait Screen: Send {
    fn id(&self) -> ScreenId;

    fn bindings(&self) -> &Bindings;

    /// Called exactly once, synchronously, before any background task.
    fn initialize(&mut self) -> Result<()>;

    /// Continuous update job, if this screen has one.
    fn updater(&self) -> Option<Box<dyn Update>> {
        None
    }

    /// Menu state, if this screen is a menu.
    fn menu(&mut self) -> Option<&mut MenuScreen> {
        None
    }

    /// Handle a screen-local action.
    fn handle(&mut self, _action: ScreenAction) -> Result<Outcome> {
        Err(NavigationError::UnsupportedAction(self.id()).into())
    }
}

// ---------------------------------------------------------------------------
// Shared collaborators
// ---------------------------------------------------------------------------

/// Shared display.  A frame (clear + lines) is written under one lock so
/// frames from the foreground loop and the background task never
/// interleave.
#[derive(Clone)]
pub struct DisplayHandle(Arc<Mutex<Box<dyn Display>>>);

impl DisplayHandle {
    pub fn new(display: Box<dyn Display>) -> Self {
        Self(Arc::new(Mutex::new(display)))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Display>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole screen with `lines`.
    pub fn show(&self, lines: &[&str]) -> Result<()> {
        let mut display = self.lock();
        display.clear()?;
        for line in lines {
            display.write_line(line)?;
        }
        Ok(())
    }

    /// Program the cursor glyphs.
    pub fn load_glyphs(&self) -> Result<()> {
        let mut display = self.lock();
        for glyph in glyphs::ALL {
            display.create_glyph(glyph.slot, &glyph.bitmap)?;
        }
        Ok(())
    }
}

/// Everything a screen may need, handed to each factory in the table.
#[derive(Clone)]
pub struct ScreenContext {
    pub display: DisplayHandle,
    pub probes: ProbeHandle,
    pub predictor: Arc<dyn Predictor>,
    pub calibrator: Arc<dyn Calibrator>,
    pub sink: Arc<dyn EventSink>,
    /// Menu window height.
    pub visible_lines: usize,
}

impl ScreenContext {
    pub fn emit(&self, event: AppEvent) {
        self.sink.emit(&event);
    }
}
