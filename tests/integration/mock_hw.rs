//! Mock hardware adapters for integration tests.
//!
//! Every fake shares its state behind an `Arc` so a test keeps a handle
//! while the navigator (and its background task) owns the adapter.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use nh4meter::app::events::AppEvent;
use nh4meter::app::ports::{
    ButtonInput, Calibrator, Clock, Display, EventSink, Predictor, SelectLines, SerialPort,
};
use nh4meter::config::{ControllerConfig, JoinPolicy, RepeatPolicy};
use nh4meter::drivers::button::{Button, PRESSED_LEVEL};
use nh4meter::error::{Error, IoError, Result};
use nh4meter::nav::Navigator;
use nh4meter::screens::{build_screen_table, DisplayHandle, ScreenContext};
use nh4meter::sensors::channel::Channel;
use nh4meter::sensors::{ProbeHandle, ProbeLink};

// ── Probe bus ─────────────────────────────────────────────────

#[derive(Default)]
struct BusState {
    levels: (bool, bool),
    pending: Vec<u8>,
    answers: Vec<(Channel, Vec<u8>)>,
    outgoing: VecDeque<u8>,
    requests: Vec<(Channel, String)>,
}

impl BusState {
    fn selected(&self) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|c| (c.levels().a, c.levels().b) == self.levels)
    }
}

/// Serial link plus select lines.  Each complete request line queues the
/// canned answer of the channel selected at that moment.  The receive
/// buffer survives channel switches, as on the real UART.
#[derive(Clone, Default)]
pub struct FakeProbeBus {
    state: Arc<Mutex<BusState>>,
    /// While `true`, reads block until [`open`](Self::open) is called.
    gate: Arc<(Mutex<bool>, Condvar)>,
}

#[allow(dead_code)]
impl FakeProbeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes answering 25.0 °C, 1413 µS/cm and 200.0 mV.
    pub fn healthy() -> Self {
        let bus = Self::new();
        bus.answer(Channel::Temperature, b"25.0\r");
        bus.answer(Channel::Conductivity, b"1413,1.0,0\r");
        bus.answer(Channel::Redox, b"200.0\r");
        bus
    }

    pub fn answer(&self, channel: Channel, bytes: &[u8]) {
        let mut st = self.state.lock().unwrap();
        st.answers.retain(|(c, _)| *c != channel);
        st.answers.push((channel, bytes.to_vec()));
    }

    pub fn requests(&self) -> Vec<(Channel, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Stall every read until [`open`](Self::open).
    pub fn close(&self) {
        *self.gate.0.lock().unwrap() = true;
    }

    pub fn open(&self) {
        *self.gate.0.lock().unwrap() = false;
        self.gate.1.notify_all();
    }

    /// Bytes already waiting in the receive buffer.
    pub fn inject(&self, bytes: &[u8]) {
        self.state.lock().unwrap().outgoing.extend(bytes.iter().copied());
    }
}

impl SerialPort for FakeProbeBus {
    fn write_all(&mut self, bytes: &[u8]) -> core::result::Result<(), IoError> {
        let mut st = self.state.lock().unwrap();
        for &b in bytes {
            if b != b'\r' {
                st.pending.push(b);
                continue;
            }
            let request = String::from_utf8(std::mem::take(&mut st.pending)).unwrap();
            let Some(channel) = st.selected() else {
                continue;
            };
            st.requests.push((channel, request));
            let answer = st
                .answers
                .iter()
                .find(|(c, _)| *c == channel)
                .map(|(_, a)| a.clone())
                .unwrap_or_default();
            st.outgoing.extend(answer);
        }
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Option<Duration>) -> core::result::Result<Option<u8>, IoError> {
        let (closed, cvar) = &*self.gate;
        drop(cvar.wait_while(closed.lock().unwrap(), |c| *c).unwrap());
        Ok(self.state.lock().unwrap().outgoing.pop_front())
    }

    fn discard_input(&mut self) -> core::result::Result<(), IoError> {
        self.state.lock().unwrap().outgoing.clear();
        Ok(())
    }
}

impl SelectLines for FakeProbeBus {
    fn set_levels(&mut self, a: bool, b: bool) -> core::result::Result<(), IoError> {
        self.state.lock().unwrap().levels = (a, b);
        Ok(())
    }
}

// ── Display ───────────────────────────────────────────────────

/// Records every frame (a `clear` followed by its lines).
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    frames: Arc<Mutex<Vec<Vec<String>>>>,
    glyphs: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn frames(&self) -> Vec<Vec<String>> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last_frame(&self) -> Vec<String> {
        self.frames().last().cloned().unwrap_or_default()
    }

    pub fn glyph_slots(&self) -> Vec<u8> {
        self.glyphs.lock().unwrap().clone()
    }
}

impl Display for RecordingDisplay {
    fn clear(&mut self) -> core::result::Result<(), IoError> {
        self.frames.lock().unwrap().push(Vec::new());
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> core::result::Result<(), IoError> {
        let mut frames = self.frames.lock().unwrap();
        match frames.last_mut() {
            Some(frame) => frame.push(text.to_string()),
            None => frames.push(vec![text.to_string()]),
        }
        Ok(())
    }

    fn create_glyph(&mut self, slot: u8, _bitmap: &[u8; 8]) -> core::result::Result<(), IoError> {
        self.glyphs.lock().unwrap().push(slot);
        Ok(())
    }
}

// ── Keypad and clock ──────────────────────────────────────────

/// Keypad whose levels the test sets directly.  All keys start released.
#[derive(Clone)]
pub struct ScriptedButtons(Arc<Mutex<[bool; Button::COUNT]>>);

impl Default for ScriptedButtons {
    fn default() -> Self {
        Self(Arc::new(Mutex::new([!PRESSED_LEVEL; Button::COUNT])))
    }
}

impl ScriptedButtons {
    pub fn hold(&self, button: Button) {
        self.0.lock().unwrap()[button.index()] = PRESSED_LEVEL;
    }

    pub fn release(&self, button: Button) {
        self.0.lock().unwrap()[button.index()] = !PRESSED_LEVEL;
    }
}

impl ButtonInput for ScriptedButtons {
    fn level(&mut self, button: Button) -> core::result::Result<bool, IoError> {
        Ok(self.0.lock().unwrap()[button.index()])
    }
}

#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU32>);

impl ManualClock {
    pub fn advance(&self, ms: u32) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Collaborators ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn measurements(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AppEvent::Measurement(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

/// Returns a fixed estimate and records every call.
#[derive(Clone, Default)]
pub struct RecordingPredictor(Arc<Mutex<Vec<(f32, u32, f32)>>>);

#[allow(dead_code)]
impl RecordingPredictor {
    pub const ESTIMATE: f32 = 1.25;

    pub fn calls(&self) -> Vec<(f32, u32, f32)> {
        self.0.lock().unwrap().clone()
    }
}

impl Predictor for RecordingPredictor {
    fn predict(&self, temperature: f32, conductivity: u32, redox: f32) -> Option<f32> {
        self.0.lock().unwrap().push((temperature, conductivity, redox));
        Some(Self::ESTIMATE)
    }
}

#[derive(Clone, Default)]
pub struct RecordingCalibrator {
    calls: Arc<Mutex<Vec<(Channel, f32)>>>,
    reject: bool,
}

#[allow(dead_code)]
impl RecordingCalibrator {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(Channel, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Calibrator for RecordingCalibrator {
    fn calibrate(&self, channel: Channel, reference: f32) -> Result<()> {
        self.calls.lock().unwrap().push((channel, reference));
        if self.reject {
            Err(Error::Io(IoError::Serial))
        } else {
            Ok(())
        }
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Fast timings: 10 ms debounce, single-press keys, short probe timeout.
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        debounce_ms: 10,
        repeat_policy: RepeatPolicy::SinglePress,
        poll_interval_ms: 10,
        update_interval_ms: 5,
        join_policy: JoinPolicy::Hard,
        join_timeout_ms: 1_000,
        read_timeout_ms: Some(20),
        read_retries: 0,
        ..ControllerConfig::default()
    }
}

/// Everything a navigator needs, with test-side handles on each fake.
#[derive(Clone, Default)]
pub struct Rig {
    pub bus: FakeProbeBus,
    pub display: RecordingDisplay,
    pub buttons: ScriptedButtons,
    pub clock: ManualClock,
    pub sink: RecordingSink,
    pub predictor: RecordingPredictor,
    pub calibrator: RecordingCalibrator,
}

#[allow(dead_code)]
impl Rig {
    pub fn healthy() -> Self {
        Self {
            bus: FakeProbeBus::healthy(),
            ..Self::default()
        }
    }

    pub fn navigator(&self) -> Navigator<ScriptedButtons, ManualClock> {
        self.navigator_with(&test_config())
    }

    pub fn navigator_with(&self, config: &ControllerConfig) -> Navigator<ScriptedButtons, ManualClock> {
        let link = ProbeLink::new(Box::new(self.bus.clone()), Box::new(self.bus.clone()), config);
        let ctx = ScreenContext {
            display: DisplayHandle::new(Box::new(self.display.clone())),
            probes: ProbeHandle::new(link),
            predictor: Arc::new(self.predictor.clone()),
            calibrator: Arc::new(self.calibrator.clone()),
            sink: Arc::new(self.sink.clone()),
            visible_lines: config.visible_lines.into(),
        };
        let table = build_screen_table().unwrap();
        Navigator::new(table, ctx, self.buttons.clone(), self.clock.clone(), config)
    }

    /// Hold `buttons` long enough for one debounced press, then release
    /// and let the release settle.
    pub fn press(&self, nav: &mut Navigator<ScriptedButtons, ManualClock>, buttons: &[Button]) {
        for &b in buttons {
            self.buttons.hold(b);
        }
        self.clock.advance(1);
        nav.poll().unwrap();
        self.clock.advance(20);
        nav.poll().unwrap();
        for &b in buttons {
            self.buttons.release(b);
        }
        self.clock.advance(1);
        nav.poll().unwrap();
        self.clock.advance(20);
        nav.poll().unwrap();
    }

    /// Spin until `cond` holds or two seconds pass.
    pub fn wait_for(&self, mut cond: impl FnMut(&Self) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond(self) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        cond(self)
    }
}
