//! Sensor subsystem: thermistor conversion and the aggregating [`SensorHub`].
//!
//! The hub owns one [`FilteredTemperature`] per probe and produces a
//! [`TemperatureSnapshot`] each loop iteration that gets written into
//! `FsmContext.temps`.  Raw sampling happens behind the
//! [`SensorPort`](crate::app::ports::SensorPort); the hub only filters.

pub mod thermistor;

use crate::config::ChillerConfig;
use crate::fsm::context::TemperatureSnapshot;
use thermistor::FilteredTemperature;

/// One raw ADC sample from each probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawReadings {
    /// Coolant probe.
    pub primary: u16,
    /// Enclosure probe.
    pub case: u16,
}

/// Owns both probe filters.
pub struct SensorHub {
    primary: FilteredTemperature,
    case: FilteredTemperature,
}

impl SensorHub {
    pub fn new(config: &ChillerConfig) -> Self {
        Self {
            primary: FilteredTemperature::new(config.primary_filter_weight),
            case: FilteredTemperature::new(config.case_filter_weight),
        }
    }

    /// Feed one pair of raw samples and return the refreshed snapshot.
    pub fn update(&mut self, raw: RawReadings) -> TemperatureSnapshot {
        TemperatureSnapshot {
            primary_c: self.primary.update(raw.primary),
            case_c: self.case.update(raw.case),
        }
    }
}
