//! End-to-end tests for the control loop: bring-up, the duty cycle,
//! the safety halt and the per-second presentation work.

use std::cell::Cell;
use std::rc::Rc;

use chiller::adapters::hardware::HardwareAdapter;
use chiller::app::events::AppEvent;
use chiller::app::ports::Actuator;
use chiller::app::service::{AppService, LoopStatus};
use chiller::bringup;
use chiller::config::ChillerConfig;
use chiller::display::DisplayFrame;
use chiller::error::{Error, Excursion, FatalFault, Sensor};
use chiller::fsm::StateId;
use chiller::fsm::states::build_state_table;
use chiller::halt::HaltPresenter;
use chiller::sensors::thermistor::raw_for_celsius;
use embedded_hal::digital::{ErrorType, OutputPin};

use super::mock_hw::{MockDelay, MockPlant, RecordingDisplay, RecordingSink};

// ── Rig ───────────────────────────────────────────────────────

/// Loop clock start; every run crosses the `u32` wrap.
const START_MS: u32 = u32::MAX - 10_500;

struct Rig {
    app: AppService,
    plant: MockPlant,
    sink: RecordingSink,
    display: RecordingDisplay,
    now_ms: u32,
}

impl Rig {
    fn new(config: ChillerConfig, primary_c: f32, case_c: f32) -> Self {
        let mut app = AppService::new(config).unwrap();
        let mut plant = MockPlant::at(primary_c, case_c);
        let mut sink = RecordingSink::new();
        bringup::run(&mut app, &mut plant, &mut MockDelay::default(), &mut sink).unwrap();
        app.start(START_MS, &mut sink);
        Self {
            app,
            plant,
            sink,
            display: RecordingDisplay::default(),
            now_ms: START_MS,
        }
    }

    fn step_ms(&mut self, ms: u32) -> LoopStatus {
        self.now_ms = self.now_ms.wrapping_add(ms);
        self.app.tick(self.now_ms, &mut self.plant, &mut self.sink, &mut self.display)
    }

    fn step(&mut self) -> LoopStatus {
        self.step_ms(1000)
    }

    /// Step whole seconds until `state` is reached; returns the count.
    fn run_until(&mut self, state: StateId, max_secs: u32) -> u32 {
        for secs in 1..=max_secs {
            assert_eq!(self.step(), LoopStatus::Running);
            if self.app.state() == state {
                return secs;
            }
        }
        panic!("still in {} after {max_secs}s, wanted {state}", self.app.state());
    }

    /// Step `step_ms` at a time until `state` is reached; returns the
    /// elapsed seconds at the transition.
    fn run_until_at(&mut self, state: StateId, step_ms: u32, max_steps: u32) -> u32 {
        for _ in 0..max_steps {
            assert_eq!(self.step_ms(step_ms), LoopStatus::Running);
            if self.app.state() == state {
                return self.app.elapsed_secs();
            }
        }
        panic!("still in {} after {max_steps} steps, wanted {state}", self.app.state());
    }

    fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    fn loads(&self) -> [bool; 4] {
        Actuator::ALL.map(|a| self.plant.is_on(a))
    }
}

/// Unfiltered readings and a short holding period keep the scenario brief.
fn scenario_config() -> ChillerConfig {
    ChillerConfig {
        primary_filter_weight: 0,
        case_filter_weight: 0,
        initial_case_target_c: 22.0,
        holding_duration_secs: 30,
        ..ChillerConfig::default()
    }
}

// ── Duty cycle ────────────────────────────────────────────────

#[test]
fn full_duty_cycle_adapts_case_target() {
    let mut rig = Rig::new(scenario_config(), 20.0, 20.0);
    assert_eq!(rig.app.state(), StateId::Idle);

    // Warm coolant starts a cycle on the first second.
    assert_eq!(rig.run_until(StateId::Starting, 2), 1);
    //                   compressor solenoid fan  pump
    assert_eq!(rig.loads(), [true, true, false, true]);

    assert_eq!(rig.run_until(StateId::Cooling, 5), 3);
    assert_eq!(rig.loads(), [true, false, true, true]);

    // At target, but Cooling must dwell past five seconds first.
    rig.plant.primary_c = 15.7;
    assert_eq!(rig.run_until(StateId::Holding, 10), 6);
    assert_eq!(rig.loads(), [true, true, true, true]);

    // Inside the band for the whole holding period.
    assert_eq!(rig.run_until(StateId::Cooldown, 31), 30);
    assert_eq!(rig.loads(), [false, false, true, true]);

    rig.plant.case_c = 26.0;
    assert_eq!(rig.run_until(StateId::Idle, 61), 60);
    assert_eq!(rig.loads(), [false, false, false, true]);

    assert_eq!(
        rig.transitions(),
        vec![
            (StateId::Idle, StateId::Starting),
            (StateId::Starting, StateId::Cooling),
            (StateId::Cooling, StateId::Holding),
            (StateId::Holding, StateId::Cooldown),
            (StateId::Cooldown, StateId::Idle),
        ]
    );

    let adapted = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::CaseTargetAdapted { from_c, to_c } => Some((*from_c, *to_c)),
        _ => None,
    });
    let (from_c, to_c) = adapted.expect("case target adapted on return to Idle");
    assert!((from_c - 22.0).abs() < 1e-4);
    // (3 * 22 + 26 + 2) / 4
    assert!((to_c - 23.5).abs() < 0.05, "got {to_c}");
    assert!((rig.app.case_target_c() - to_c).abs() < 1e-6);

    // The enclosure is still above the new target.
    assert_eq!(rig.run_until(StateId::Cooldown, 1), 1);
}

#[test]
fn default_settings_run_one_filtered_cycle() {
    let config = ChillerConfig::default();
    let loop_ms = config.loop_delay_ms;
    let mut rig = Rig::new(config, 25.0, 20.0);

    // Coolant above 16.8 °C, enclosure below its 25 °C target.
    assert_eq!(rig.run_until_at(StateId::Starting, loop_ms, 1), 0);
    let starting_at = rig.app.elapsed_secs();
    let cooling_at = rig.run_until_at(StateId::Cooling, loop_ms, 100);
    assert_eq!(cooling_at - starting_at, 3);

    // The heavy coolant filter needs roughly 35 s to come down to target.
    rig.plant.primary_c = 15.7;
    let holding_at = rig.run_until_at(StateId::Holding, loop_ms, 2_000);
    let pull_down = holding_at - cooling_at;
    assert!((30..=40).contains(&pull_down), "reached target after {pull_down}s");
    assert_eq!(rig.loads(), [true, true, true, true]);

    // Settled inside the band: the full ten minutes elapse.
    let cooldown_at = rig.run_until_at(StateId::Cooldown, loop_ms, 13_000);
    assert_eq!(cooldown_at - holding_at, 600);

    let idle_at = rig.run_until_at(StateId::Idle, loop_ms, 1_300);
    assert_eq!(idle_at - cooldown_at, 60);
    assert_eq!(rig.loads(), [false, false, false, true]);

    assert_eq!(
        rig.transitions(),
        vec![
            (StateId::Idle, StateId::Starting),
            (StateId::Starting, StateId::Cooling),
            (StateId::Cooling, StateId::Holding),
            (StateId::Holding, StateId::Cooldown),
            (StateId::Cooldown, StateId::Idle),
        ]
    );
    // (3 * 25 + 20 + 2) / 4
    assert!((rig.app.case_target_c() - 24.25).abs() < 0.05, "got {}", rig.app.case_target_c());

    // Cool coolant and enclosure below the new target: nothing to do.
    for _ in 0..200 {
        assert_eq!(rig.step_ms(loop_ms), LoopStatus::Running);
    }
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.transitions().len(), 5);
}

#[test]
fn cooldown_restarts_when_coolant_warms() {
    let mut rig = Rig::new(scenario_config(), 20.0, 20.0);
    rig.run_until(StateId::Cooling, 5);
    rig.plant.primary_c = 15.7;
    rig.run_until(StateId::Holding, 10);
    // Far below the band ends holding early.
    rig.plant.primary_c = 14.0;
    assert_eq!(rig.run_until(StateId::Cooldown, 2), 1);

    rig.plant.primary_c = 18.0;
    assert_eq!(rig.run_until(StateId::Starting, 2), 1);
    assert!(
        !rig.sink.events.iter().any(|e| matches!(e, AppEvent::CaseTargetAdapted { .. })),
        "adaptation only happens on the way back to Idle"
    );
}

#[test]
fn warm_enclosure_sends_idle_to_cooldown() {
    let mut rig = Rig::new(scenario_config(), 15.0, 24.0);
    assert_eq!(rig.run_until(StateId::Cooldown, 1), 1);
    assert_eq!(rig.loads(), [false, false, true, true]);
}

// ── Safety ────────────────────────────────────────────────────

#[test]
fn overheated_coolant_halts_with_everything_off() {
    let mut rig = Rig::new(scenario_config(), 20.0, 20.0);
    rig.run_until(StateId::Cooling, 5);

    rig.plant.primary_c = 52.0;
    let status = rig.step();
    let LoopStatus::Halted(fault) = status else {
        panic!("expected halt, got {status:?}");
    };
    assert!(matches!(
        fault,
        FatalFault::SensorOutOfBounds { sensor: Sensor::Primary, excursion: Excursion::High, .. }
    ));
    assert_eq!(fault.code(), 2);
    assert!(!rig.plant.any_on());
    assert!(rig.sink.events.contains(&AppEvent::Halted(fault)));

    // Halt is terminal: back in range changes nothing, loads stay off.
    rig.plant.primary_c = 16.0;
    rig.plant.loads[Actuator::Pump as usize] = true;
    assert_eq!(rig.step(), LoopStatus::Halted(fault));
    assert!(!rig.plant.any_on());
    assert_eq!(rig.app.halted(), Some(fault));
}

#[test]
fn frozen_enclosure_probe_halts() {
    let mut rig = Rig::new(scenario_config(), 15.0, 20.0);
    rig.plant.case_c = 1.5;
    let status = rig.step();
    assert!(matches!(
        status,
        LoopStatus::Halted(FatalFault::SensorOutOfBounds {
            sensor: Sensor::Case,
            excursion: Excursion::Low,
            ..
        })
    ));
    assert!(!rig.plant.any_on());
}

#[test]
fn coolant_just_below_minimum_halts_with_pump_off() {
    let mut rig = Rig::new(scenario_config(), 15.0, 20.0);
    assert!(rig.plant.is_on(Actuator::Pump));

    rig.plant.primary_c = 2.9;
    let status = rig.step_ms(50);
    let LoopStatus::Halted(fault) = status else {
        panic!("expected halt, got {status:?}");
    };
    assert!(matches!(
        fault,
        FatalFault::SensorOutOfBounds { sensor: Sensor::Primary, excursion: Excursion::Low, .. }
    ));
    assert_eq!(fault.code(), 1);
    assert!(!rig.plant.any_on());
    assert!(rig.transitions().is_empty());
}

// ── Halt presentation ─────────────────────────────────────────

#[test]
fn misordered_state_table_reaches_the_halt_screen() {
    let mut table = build_state_table();
    table.swap(1, 2);

    let Err(Error::Fatal(fault)) = AppService::with_table(ChillerConfig::default(), table) else {
        panic!("a misordered table must be rejected as a fatal fault");
    };
    assert_eq!(fault, FatalFault::UnknownState(1));
    assert_eq!(fault.code(), 9);

    let mut plant = MockPlant::at(18.0, 22.0);
    plant.loads = [true; 4];
    let mut display = RecordingDisplay::default();
    let presenter = HaltPresenter::new(fault, 0);

    let shown = presenter.drive(2000, &mut plant, &mut display);
    assert!(shown.tone_on);
    assert_eq!(shown.frame, DisplayFrame::Alarm { code: 9, show_code: true });
    assert_eq!(display.frames.last().map(|f| f.render()).as_deref(), Some("E 09"));
    assert!(!plant.loads.iter().any(|&on| on));
    assert!(plant.buzzer);

    // Half a second later the tone is off and the loads stay off.
    presenter.drive(2500, &mut plant, &mut display);
    assert!(!plant.buzzer);
    assert!(!plant.any_on());
}

// ── Presentation ──────────────────────────────────────────────

#[test]
fn presentation_runs_once_per_second_across_wrap() {
    let config = ChillerConfig {
        telemetry_interval_secs: 5,
        ..scenario_config()
    };
    let mut rig = Rig::new(config, 15.0, 20.0);

    // 20 s of 50 ms iterations, crossing the u32 wrap on the way.
    for _ in 0..400 {
        assert_eq!(rig.step_ms(50), LoopStatus::Running);
    }

    assert_eq!(rig.app.elapsed_secs(), 20);
    assert_eq!(rig.app.tick_count(), 400);
    assert_eq!(rig.sink.telemetry_count(), 4);
    assert_eq!(rig.display.frames.len(), 20);
    assert_eq!(
        rig.display.frames.iter().filter(|f| matches!(f, DisplayFrame::Temperature(_))).count(),
        4
    );
    assert!(rig.display.frames.contains(&DisplayFrame::State(StateId::Idle)));
}

#[test]
fn telemetry_reports_thresholds_and_state() {
    let mut rig = Rig::new(scenario_config(), 15.0, 20.0);
    rig.step();
    let record = rig.app.telemetry();
    assert_eq!(record.state, StateId::Idle);
    assert!((record.target_c - 16.0).abs() < 1e-6);
    assert!((record.start_threshold_c - 16.8).abs() < 1e-5);
    assert!((record.case_target_c - 22.0).abs() < 1e-6);
    assert!((record.primary_c - 15.0).abs() < 0.1);
}

// ── Hardware adapter end to end ───────────────────────────────

#[derive(Clone, Default)]
struct SharedPin(Rc<Cell<bool>>);

impl ErrorType for SharedPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SharedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

fn warm_adc(_channel: u32) -> u16 {
    raw_for_celsius(19.0)
}

#[test]
fn hardware_adapter_drives_pins_through_a_cycle_start() {
    let pins: [SharedPin; 4] = Default::default();
    let buzzer = SharedPin::default();
    let mut hw = HardwareAdapter::new(pins.clone(), buzzer.clone(), warm_adc);

    let mut app = AppService::new(scenario_config()).unwrap();
    let mut sink = RecordingSink::new();
    bringup::run(&mut app, &mut hw, &mut MockDelay::default(), &mut sink).unwrap();
    assert!(pins[Actuator::Pump as usize].0.get());

    app.start(0, &mut sink);
    let mut display = RecordingDisplay::default();
    assert_eq!(app.tick(1000, &mut hw, &mut sink, &mut display), LoopStatus::Running);

    assert_eq!(app.state(), StateId::Starting);
    let levels = pins.each_ref().map(|p| p.0.get());
    assert_eq!(levels, [true, true, false, true]);
    assert!(!buzzer.0.get());
    assert!(hw.is_on(Actuator::Compressor));
}
