//! Safety monitor.
//!
//! Runs **every iteration after the FSM** and once at bring-up, checking
//! both filtered temperatures against fixed absolute bounds.
//!
//! ## Fault lifecycle
//!
//! 1. A filtered temperature leaves its range (or is NaN).
//! 2. The monitor latches a [`FatalFault`] and returns it.
//! 3. The service forces every actuator off and halts.
//! 4. Every later check returns the same fault.  Nothing clears it short
//!    of a power cycle.

use crate::config::ChillerConfig;
use crate::error::{Excursion, FatalFault, Sensor};
use log::error;

/// Inclusive absolute range for one probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_c: f32,
    pub max_c: f32,
}

impl Bounds {
    /// `None` when `reading` is inside the range.  NaN reads as low.
    fn excursion(&self, reading: f32) -> Option<Excursion> {
        if (self.min_c..=self.max_c).contains(&reading) {
            None
        } else if reading > self.max_c {
            Some(Excursion::High)
        } else {
            Some(Excursion::Low)
        }
    }
}

pub struct SafetyMonitor {
    primary: Bounds,
    case: Bounds,
    /// First fault seen; sticky for the rest of the run.
    latched: Option<FatalFault>,
}

impl SafetyMonitor {
    pub fn new(config: &ChillerConfig) -> Self {
        Self {
            primary: Bounds {
                min_c: config.primary_min_c,
                max_c: config.primary_max_c,
            },
            case: Bounds {
                min_c: config.case_min_c,
                max_c: config.case_max_c,
            },
            latched: None,
        }
    }

    /// Check both filtered temperatures.  The primary probe is checked
    /// first, so it wins when both are out of range.
    pub fn check(&mut self, primary_c: f32, case_c: f32) -> Result<(), FatalFault> {
        if let Some(fault) = self.latched {
            return Err(fault);
        }

        let fault = [(Sensor::Primary, self.primary, primary_c), (Sensor::Case, self.case, case_c)]
            .into_iter()
            .find_map(|(sensor, bounds, reading_c)| {
                bounds.excursion(reading_c).map(|excursion| FatalFault::SensorOutOfBounds {
                    sensor,
                    excursion,
                    reading_c,
                })
            });

        match fault {
            Some(fault) => {
                error!("SAFETY FAULT: {fault}");
                self.latched = Some(fault);
                Err(fault)
            }
            None => Ok(()),
        }
    }

    /// Latch a fault raised outside the temperature checks.
    pub fn latch(&mut self, fault: FatalFault) {
        if self.latched.is_none() {
            error!("SAFETY FAULT: {fault}");
            self.latched = Some(fault);
        }
    }

    pub fn latched(&self) -> Option<FatalFault> {
        self.latched
    }
}
