//! Mock hardware for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO registers.  Temperatures go in as
//! °C and come out as the raw counts a thermistor divider would produce.

use chiller::app::events::AppEvent;
use chiller::app::ports::{Actuator, ActuatorPort, DisplayPort, EventSink, SensorPort};
use chiller::display::DisplayFrame;
use chiller::sensors::RawReadings;
use chiller::sensors::thermistor::raw_for_celsius;
use embedded_hal::delay::DelayNs;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Set { actuator: Actuator, on: bool },
    Buzzer(bool),
}

// ── MockPlant ─────────────────────────────────────────────────

pub struct MockPlant {
    pub primary_c: f32,
    pub case_c: f32,
    pub loads: [bool; 4],
    pub buzzer: bool,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockPlant {
    pub fn at(primary_c: f32, case_c: f32) -> Self {
        Self {
            primary_c,
            case_c,
            loads: [false; 4],
            buzzer: false,
            calls: Vec::new(),
        }
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.loads[actuator as usize]
    }

    pub fn any_on(&self) -> bool {
        self.loads.iter().any(|&on| on)
    }

    /// Loads switched on, in the order they were switched.
    pub fn switched_on(&self) -> Vec<Actuator> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Set { actuator, on: true } => Some(*actuator),
                _ => None,
            })
            .collect()
    }
}

impl SensorPort for MockPlant {
    fn read_raw(&mut self) -> RawReadings {
        RawReadings {
            primary: raw_for_celsius(self.primary_c),
            case: raw_for_celsius(self.case_c),
        }
    }
}

impl ActuatorPort for MockPlant {
    fn set(&mut self, actuator: Actuator, on: bool) {
        self.loads[actuator as usize] = on;
        self.calls.push(ActuatorCall::Set { actuator, on });
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
        self.calls.push(ActuatorCall::Buzzer(on));
    }
}

// ── Recording sink / display ──────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, AppEvent::Telemetry(_))).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<DisplayFrame>,
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, frame: &DisplayFrame) {
        self.frames.push(*frame);
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Counts requested delay instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
