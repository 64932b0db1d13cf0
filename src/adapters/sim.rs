//! Simulated chiller plant for host runs.
//!
//! A first-order thermal model good enough to walk the controller through
//! every duty state: a constant heat load warms the coolant, the
//! compressor pulls it down (much less with the bypass open), and the
//! enclosure drifts toward ambient while the compressor heats it and the
//! fan cools it.  Temperatures leave through the same raw ADC counts a
//! real thermistor divider would produce.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{Actuator, ActuatorPort, SensorPort};
use crate::sensors::RawReadings;
use crate::sensors::thermistor::raw_for_celsius;

/// Plant coefficients, all per second.
#[derive(Debug, Clone, Copy)]
pub struct PlantModel {
    pub ambient_c: f32,
    /// Coolant warming from the attached machine.
    pub heat_load_c: f32,
    /// Coolant cooling with the compressor on and the bypass closed.
    pub cooling_c: f32,
    /// Share of `cooling_c` that remains with the bypass open.
    pub bypass_fraction: f32,
    /// Enclosure relaxation rate toward ambient.
    pub case_leak: f32,
    pub compressor_case_heat_c: f32,
    pub fan_case_cooling_c: f32,
}

impl Default for PlantModel {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            heat_load_c: 0.02,
            cooling_c: 0.12,
            bypass_fraction: 0.3,
            case_leak: 0.002,
            compressor_case_heat_c: 0.03,
            fan_case_cooling_c: 0.04,
        }
    }
}

/// Simulated plant implementing the hardware ports.
pub struct SimulatedChiller {
    model: PlantModel,
    primary_c: f32,
    case_c: f32,
    loads: [bool; 4],
    buzzer: bool,
}

impl SimulatedChiller {
    pub fn new(model: PlantModel, primary_c: f32, case_c: f32) -> Self {
        Self {
            model,
            primary_c,
            case_c,
            loads: [false; 4],
            buzzer: false,
        }
    }

    /// Integrate the plant over `dt_ms` with the current relay states.
    pub fn advance(&mut self, dt_ms: u32) {
        let dt = dt_ms as f32 / 1000.0;
        let m = &self.model;
        let on = |a: Actuator| self.loads[a as usize];

        let mut coolant = m.heat_load_c;
        if on(Actuator::Compressor) {
            let share = if on(Actuator::Solenoid) { m.bypass_fraction } else { 1.0 };
            coolant -= m.cooling_c * share;
        }

        let mut case = m.case_leak * (m.ambient_c - self.case_c);
        if on(Actuator::Compressor) {
            case += m.compressor_case_heat_c;
        }
        if on(Actuator::Fan) && self.case_c > m.ambient_c {
            case -= m.fan_case_cooling_c;
        }

        self.primary_c += coolant * dt;
        self.case_c += case * dt;
    }

    pub fn primary_c(&self) -> f32 {
        self.primary_c
    }

    pub fn case_c(&self) -> f32 {
        self.case_c
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.loads[actuator as usize]
    }
}

impl SensorPort for SimulatedChiller {
    fn read_raw(&mut self) -> RawReadings {
        RawReadings {
            primary: raw_for_celsius(self.primary_c),
            case: raw_for_celsius(self.case_c),
        }
    }
}

impl ActuatorPort for SimulatedChiller {
    fn set(&mut self, actuator: Actuator, on: bool) {
        self.loads[actuator as usize] = on;
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
    }
}

/// Virtual millisecond clock for accelerated simulation.  Starts close
/// to the `u32` wrap so every run crosses it.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    now_ms: u32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::starting_at(u32::MAX - 30_000)
    }
}

impl SimClock {
    pub fn starting_at(now_ms: u32) -> Self {
        Self { now_ms }
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    pub fn advance(&mut self, ms: u32) -> u32 {
        self.now_ms = self.now_ms.wrapping_add(ms);
        self.now_ms
    }
}

/// Delays during bring-up advance virtual time instead of sleeping.
impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}
