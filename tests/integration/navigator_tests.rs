//! Navigator behaviour driven through the keypad: menus, transitions,
//! background task lifecycle, calibration.

use nh4meter::app::events::AppEvent;
use nh4meter::config::{ControllerConfig, JoinPolicy};
use nh4meter::drivers::button::Button;
use nh4meter::error::{Error, NavigationError, ProtocolError};
use nh4meter::nav::PLEASE_WAIT;
use nh4meter::screens::calibrate::CALIBRATION_FAILED;
use nh4meter::screens::measure::{MEASURING, PROBE_ERROR};
use nh4meter::screens::ScreenId;
use nh4meter::sensors::channel::Channel;

use crate::mock_hw::{test_config, FakeProbeBus, RecordingCalibrator, Rig};

fn welcome_frame(selected: usize) -> Vec<String> {
    ["Measure", "Calibrate"]
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let cursor = if i == selected { '\u{0}' } else { ' ' };
            format!("{cursor}{label}")
        })
        .collect()
}

#[test]
fn poll_before_start_is_an_error() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    assert_eq!(nav.poll(), Err(Error::Navigation(NavigationError::NoActiveScreen)));
}

#[test]
fn start_loads_glyphs_and_shows_welcome() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();

    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert!(!nav.has_task());
    assert_eq!(rig.display.glyph_slots(), vec![0, 1]);
    assert_eq!(rig.display.last_frame(), welcome_frame(0));
    assert_eq!(
        rig.sink.events(),
        vec![
            AppEvent::ScreenChanged { from: None, to: ScreenId::Welcome },
            AppEvent::Started(ScreenId::Welcome),
        ]
    );
}

#[test]
fn menu_cursor_follows_up_and_down() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();

    rig.press(&mut nav, &[Button::Down]);
    assert_eq!(rig.display.last_frame(), welcome_frame(1));

    // Clamped at the last item, but still re-rendered.
    let before = rig.display.frames().len();
    rig.press(&mut nav, &[Button::Down]);
    assert_eq!(rig.display.last_frame(), welcome_frame(1));
    assert_eq!(rig.display.frames().len(), before + 1);

    rig.press(&mut nav, &[Button::Up]);
    assert_eq!(rig.display.last_frame(), welcome_frame(0));
}

#[test]
fn unbound_buttons_are_ignored() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();
    let before = rig.display.frames().len();

    rig.press(&mut nav, &[Button::Left]);
    rig.press(&mut nav, &[Button::Right]);

    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert_eq!(rig.display.frames().len(), before);
}

#[test]
fn held_key_reports_one_press() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::ProbeSelect).unwrap();

    rig.buttons.hold(Button::Down);
    for _ in 0..10 {
        rig.clock.advance(25);
        nav.poll().unwrap();
    }
    rig.buttons.release(Button::Down);

    let frame = rig.display.last_frame();
    assert_eq!(frame, vec![" Temperature".to_string(), "\u{0}EC".to_string()]);
}

#[test]
fn entering_and_leaving_measurement_stops_the_task() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();

    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(nav.current(), Some(ScreenId::Measure));
    assert!(nav.has_task());
    assert!(rig.display.frames().iter().any(|f| f == &[MEASURING]));
    assert!(rig.wait_for(|r| r.sink.measurements() >= 2));

    rig.press(&mut nav, &[Button::Left]);
    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert!(!nav.has_task());

    let events = rig.sink.events();
    let stopped = events
        .iter()
        .position(|e| *e == AppEvent::TaskStopped { screen: ScreenId::Measure })
        .expect("task stop reported");
    let changed = events
        .iter()
        .position(|e| {
            *e == AppEvent::ScreenChanged {
                from: Some(ScreenId::Measure),
                to: ScreenId::Welcome,
            }
        })
        .expect("transition reported");
    assert!(stopped < changed);
}

#[test]
fn new_screen_never_overlaps_the_old_task() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();

    rig.press(&mut nav, &[Button::Select]);
    assert!(rig.wait_for(|r| r.sink.measurements() >= 1));
    rig.press(&mut nav, &[Button::Left]);

    let frames = rig.display.frames();
    let wait = frames
        .iter()
        .rposition(|f| f == &[PLEASE_WAIT])
        .expect("please-wait frame");
    let welcome = wait
        + frames[wait..]
            .iter()
            .position(|f| *f == welcome_frame(0))
            .expect("welcome frame after please-wait");
    assert!(
        frames[welcome..]
            .iter()
            .all(|f| !f.first().is_some_and(|l| l.starts_with("NH4+"))),
        "measurement rendered after the welcome screen: {frames:?}"
    );

    // Nothing more is drawn once the task is gone.
    let settled = rig.display.frames().len();
    std::thread::sleep(std::time::Duration::from_millis(30));
    assert_eq!(rig.display.frames().len(), settled);
}

#[test]
fn press_after_transition_in_same_pass_is_dropped() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::ProbeSelect).unwrap();

    // Left leaves for the welcome menu; Down comes later in the same pass
    // and must not move the fresh menu's cursor.
    rig.press(&mut nav, &[Button::Left, Button::Down]);

    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert_eq!(rig.display.last_frame(), welcome_frame(0));
}

#[test]
fn calibrate_temperature_with_edited_value() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();

    rig.press(&mut nav, &[Button::Down]);
    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(nav.current(), Some(ScreenId::ProbeSelect));

    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(nav.current(), Some(ScreenId::CalibrateTemperature));
    assert_eq!(rig.display.last_frame(), vec!["25.0".to_string(), "\u{1}".to_string()]);

    rig.press(&mut nav, &[Button::Up]);
    assert_eq!(rig.display.last_frame(), vec!["35.0".to_string(), "\u{1}".to_string()]);

    rig.press(&mut nav, &[Button::Right]);
    rig.press(&mut nav, &[Button::Down]);
    assert_eq!(rig.display.last_frame(), vec!["34.0".to_string(), " \u{1}".to_string()]);

    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(rig.calibrator.calls(), vec![(Channel::Temperature, 34.0)]);
    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert!(rig.sink.events().contains(&AppEvent::Calibrated {
        channel: Channel::Temperature,
        reference: 34.0,
    }));
}

#[test]
fn conductivity_calibration_edits_first_field_only() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::CalibrateConductivity).unwrap();

    assert_eq!(rig.display.last_frame(), vec!["1413".to_string(), "\u{1}".to_string()]);
    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(rig.calibrator.calls(), vec![(Channel::Conductivity, 1413.0)]);
}

#[test]
fn rejected_calibration_stays_on_screen() {
    let rig = Rig {
        calibrator: RecordingCalibrator::rejecting(),
        ..Rig::healthy()
    };
    let mut nav = rig.navigator();
    nav.start(ScreenId::CalibrateRedox).unwrap();

    rig.press(&mut nav, &[Button::Select]);

    assert_eq!(nav.current(), Some(ScreenId::CalibrateRedox));
    assert_eq!(rig.display.last_frame()[0], CALIBRATION_FAILED);
    assert!(rig
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, AppEvent::CalibrationFailed { channel: Channel::Redox, .. })));
}

#[test]
fn calibration_without_probe_value_ignores_select() {
    let rig = Rig {
        bus: FakeProbeBus::new(),
        ..Rig::default()
    };
    let mut nav = rig.navigator();
    nav.start(ScreenId::CalibrateTemperature).unwrap();

    assert_eq!(rig.display.last_frame()[0], PROBE_ERROR);
    assert!(rig.sink.events().contains(&AppEvent::ProtocolFault(ProtocolError::Timeout(
        Channel::Temperature
    ))));

    rig.press(&mut nav, &[Button::Up]);
    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(nav.current(), Some(ScreenId::CalibrateTemperature));
    assert!(rig.calibrator.calls().is_empty());
}

fn best_effort_config() -> ControllerConfig {
    ControllerConfig {
        join_policy: JoinPolicy::BestEffort,
        join_timeout_ms: 20,
        update_interval_ms: 0,
        ..test_config()
    }
}

/// Enter the measurement screen with the probe link stalled, so the
/// update task is parked inside its first exchange.
fn measuring_with_stalled_link(rig: &Rig, config: &ControllerConfig) -> nh4meter::nav::Navigator<crate::mock_hw::ScriptedButtons, crate::mock_hw::ManualClock> {
    let mut nav = rig.navigator_with(config);
    nav.start(ScreenId::Welcome).unwrap();
    rig.bus.close();
    rig.press(&mut nav, &[Button::Select]);
    assert_eq!(nav.current(), Some(ScreenId::Measure));
    assert!(rig.wait_for(|r| !r.bus.requests().is_empty()));
    nav
}

#[test]
fn best_effort_join_detaches_stalled_task_and_transitions() {
    let rig = Rig::healthy();
    let mut nav = measuring_with_stalled_link(&rig, &best_effort_config());

    rig.press(&mut nav, &[Button::Left]);
    assert_eq!(nav.current(), Some(ScreenId::Welcome));
    assert!(!nav.has_task());

    let events = rig.sink.events();
    let timed_out = events
        .iter()
        .position(|e| *e == AppEvent::TaskJoinTimedOut { screen: ScreenId::Measure })
        .expect("join timeout reported");
    let changed = events
        .iter()
        .position(|e| {
            *e == AppEvent::ScreenChanged {
                from: Some(ScreenId::Measure),
                to: ScreenId::Welcome,
            }
        })
        .expect("transition reported");
    assert!(timed_out < changed);
    assert!(!events.contains(&AppEvent::TaskStopped { screen: ScreenId::Measure }));

    rig.bus.open();
}

#[test]
fn shutdown_reports_task_that_does_not_stop() {
    let rig = Rig::healthy();
    let nav = measuring_with_stalled_link(&rig, &best_effort_config());

    drop(nav);
    assert!(rig
        .sink
        .events()
        .contains(&AppEvent::TaskJoinTimedOut { screen: ScreenId::Measure }));

    rig.bus.open();
}

#[test]
fn shutdown_stops_running_task() {
    let rig = Rig::healthy();
    let mut nav = rig.navigator();
    nav.start(ScreenId::Welcome).unwrap();
    rig.press(&mut nav, &[Button::Select]);
    assert!(rig.wait_for(|r| r.sink.measurements() >= 1));

    drop(nav);
    assert!(rig
        .sink
        .events()
        .contains(&AppEvent::TaskStopped { screen: ScreenId::Measure }));
}
