//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, relays, event sinks, the display) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::display::DisplayFrame;
use crate::fsm::context::ActuatorOutputs;
use crate::sensors::RawReadings;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per iteration.
pub trait SensorPort {
    /// Sample both thermistor channels.  Values are opaque ADC counts;
    /// conversion and filtering happen in the domain.
    fn read_raw(&mut self) -> RawReadings;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One relay-driven load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Compressor,
    /// Bypass valve.
    Solenoid,
    Fan,
    /// Coolant circulation pump.
    Pump,
}

impl Actuator {
    pub const ALL: [Actuator; 4] = [Self::Compressor, Self::Solenoid, Self::Fan, Self::Pump];
}

/// Write-side port: the domain calls this to command the relays.
///
/// Writes are synchronous and take effect immediately.
pub trait ActuatorPort {
    /// Drive one load on or off.
    fn set(&mut self, actuator: Actuator, on: bool);

    /// Alarm buzzer, used only while halted.
    fn set_buzzer(&mut self, on: bool);

    /// Write all three duty-cycle outputs, changed or not.
    fn write_outputs(&mut self, outputs: ActuatorOutputs) {
        self.set(Actuator::Compressor, outputs.compressor);
        self.set(Actuator::Solenoid, outputs.solenoid);
        self.set(Actuator::Fan, outputs.fan);
    }

    /// Every load off, pump included: safe shutdown.
    fn all_off(&mut self) {
        for actuator in Actuator::ALL {
            self.set(actuator, false);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// test recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → seven-segment display)
// ───────────────────────────────────────────────────────────────

/// Four-digit seven-segment display.
pub trait DisplayPort {
    fn show(&mut self, frame: &DisplayFrame);
}
