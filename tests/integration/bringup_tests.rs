//! Integration tests for the power-on bring-up sequence.

use chiller::app::events::AppEvent;
use chiller::app::ports::Actuator;
use chiller::app::service::{AppService, LoopStatus};
use chiller::bringup::{self, SELF_TEST_ORDER};
use chiller::config::ChillerConfig;
use chiller::error::{Excursion, FatalFault, Sensor};

use super::mock_hw::{ActuatorCall, MockDelay, MockPlant, RecordingDisplay, RecordingSink};

fn make_app() -> AppService {
    AppService::new(ChillerConfig::default()).unwrap()
}

#[test]
fn self_test_pulses_each_load_then_leaves_pump_running() {
    let mut app = make_app();
    let mut plant = MockPlant::at(18.0, 22.0);
    let mut sink = RecordingSink::new();
    let mut delay = MockDelay::default();

    let settled = bringup::run(&mut app, &mut plant, &mut delay, &mut sink).unwrap();

    assert!((settled.primary_c - 18.0).abs() < 0.1);
    assert!((settled.case_c - 22.0).abs() < 0.1);

    let mut expected: Vec<Actuator> = SELF_TEST_ORDER.to_vec();
    expected.push(Actuator::Pump);
    assert_eq!(plant.switched_on(), expected);

    // Every pulsed load is switched off again before the next one runs.
    for actuator in SELF_TEST_ORDER {
        let on = ActuatorCall::Set { actuator, on: true };
        let off = ActuatorCall::Set { actuator, on: false };
        let on_at = plant.calls.iter().position(|c| *c == on).unwrap();
        assert_eq!(plant.calls[on_at + 1], off, "{actuator:?} not released");
    }

    assert_eq!(plant.loads, [false, false, false, true]);
    assert!(!plant.buzzer);
    assert!(sink.events.is_empty());
}

#[test]
fn settle_and_pulses_take_configured_time() {
    let config = ChillerConfig::default();
    let expected_ms = u64::from(config.settle_samples) * u64::from(config.settle_interval_ms)
        + 4 * u64::from(config.actuator_test_ms);

    let mut app = AppService::new(config).unwrap();
    let mut plant = MockPlant::at(18.0, 22.0);
    let mut delay = MockDelay::default();
    bringup::run(&mut app, &mut plant, &mut delay, &mut RecordingSink::new()).unwrap();

    assert_eq!(delay.total_ms(), expected_ms);
}

#[test]
fn out_of_range_reading_at_power_on_halts_before_self_test() {
    let mut app = make_app();
    let mut plant = MockPlant::at(60.0, 22.0);
    let mut sink = RecordingSink::new();

    let fault = bringup::run(&mut app, &mut plant, &mut MockDelay::default(), &mut sink).unwrap_err();

    assert!(matches!(
        fault,
        FatalFault::SensorOutOfBounds { sensor: Sensor::Primary, excursion: Excursion::High, .. }
    ));
    assert!(plant.switched_on().is_empty(), "no load may run after a failed pre-check");
    assert!(!plant.loads.iter().any(|&on| on));
    assert_eq!(sink.events, vec![AppEvent::Halted(fault)]);

    // The loop refuses to run afterwards.
    app.start(0, &mut sink);
    let status = app.tick(1000, &mut plant, &mut sink, &mut RecordingDisplay::default());
    assert_eq!(status, LoopStatus::Halted(fault));
    assert!(!plant.loads.iter().any(|&on| on));
}

#[test]
fn settled_temperatures_seed_the_loop() {
    let mut app = make_app();
    let mut plant = MockPlant::at(18.0, 22.0);
    let settled = bringup::run(&mut app, &mut plant, &mut MockDelay::default(), &mut RecordingSink::new()).unwrap();
    assert_eq!(settled, app.temperatures());
}
