//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the thermistor ADC channels and every relay, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only module
//! in the system that touches actual hardware.  On non-espidf targets
//! the underlying calls are cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{Actuator, ActuatorPort, SensorPort};
use crate::drivers::hw_init;
use crate::drivers::relay::{GpioOutput, Relay};
use crate::pins;
use crate::sensors::RawReadings;

/// One-shot ADC read of a channel, in 10-bit counts.
pub type AdcReadFn = fn(u32) -> u16;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P> {
    compressor: Relay<P>,
    solenoid: Relay<P>,
    fan: Relay<P>,
    pump: Relay<P>,
    buzzer: Relay<P>,
    adc_read: AdcReadFn,
}

impl HardwareAdapter<GpioOutput> {
    /// Adapter over the board's GPIOs and ADC1.  Call after
    /// [`hw_init::init_peripherals`].
    pub fn from_board() -> Self {
        Self::new(
            [
                GpioOutput::new(pins::COMPRESSOR_GPIO),
                GpioOutput::new(pins::SOLENOID_GPIO),
                GpioOutput::new(pins::FAN_GPIO),
                GpioOutput::new(pins::PUMP_GPIO),
            ],
            GpioOutput::new(pins::BUZZER_GPIO),
            hw_init::adc1_read,
        )
    }
}

impl<P: OutputPin> HardwareAdapter<P> {
    /// `loads` is in [`Actuator::ALL`] order.
    pub fn new(loads: [P; 4], buzzer: P, adc_read: AdcReadFn) -> Self {
        let [compressor, solenoid, fan, pump] = loads;
        Self {
            compressor: Relay::new(compressor, "compressor"),
            solenoid: Relay::new(solenoid, "solenoid"),
            fan: Relay::new(fan, "fan"),
            pump: Relay::new(pump, "pump"),
            buzzer: Relay::new(buzzer, "buzzer"),
            adc_read,
        }
    }

    /// Last successfully written state of a load.
    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.relay(actuator).is_on()
    }

    fn relay(&self, actuator: Actuator) -> &Relay<P> {
        match actuator {
            Actuator::Compressor => &self.compressor,
            Actuator::Solenoid => &self.solenoid,
            Actuator::Fan => &self.fan,
            Actuator::Pump => &self.pump,
        }
    }

    fn relay_mut(&mut self, actuator: Actuator) -> &mut Relay<P> {
        match actuator {
            Actuator::Compressor => &mut self.compressor,
            Actuator::Solenoid => &mut self.solenoid,
            Actuator::Fan => &mut self.fan,
            Actuator::Pump => &mut self.pump,
        }
    }
}

/// A failed relay write is logged; the next iteration writes it again.
fn drive<P: OutputPin>(relay: &mut Relay<P>, on: bool) {
    if let Err(e) = relay.set(on) {
        warn!("{}: {e}", relay.label());
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin> SensorPort for HardwareAdapter<P> {
    fn read_raw(&mut self) -> RawReadings {
        RawReadings {
            primary: (self.adc_read)(pins::PRIMARY_ADC_CHANNEL),
            case: (self.adc_read)(pins::CASE_ADC_CHANNEL),
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set(&mut self, actuator: Actuator, on: bool) {
        drive(self.relay_mut(actuator), on);
    }

    fn set_buzzer(&mut self, on: bool) {
        drive(&mut self.buzzer, on);
    }

    fn all_off(&mut self) {
        for actuator in Actuator::ALL {
            self.set(actuator, false);
        }
        self.set_buzzer(false);
    }
}
