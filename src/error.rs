//! Unified error types for the chiller firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through the safety monitor and FSM without
//! allocation.
//!
//! Fatal faults are a separate category: they are never retried.  Any
//! [`FatalFault`] halts actuation for the rest of the power cycle.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The control loop hit an unrecoverable condition.
    Fatal(FatalFault),
    /// Configuration failed validation or could not be parsed.
    Config(ConfigError),
    /// An actuator output could not be driven.
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal(e) => write!(f, "fatal: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Fatal faults
// ---------------------------------------------------------------------------

/// Which thermistor a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Sensor {
    /// Coolant (primary) temperature probe.
    Primary,
    /// Enclosure (case) temperature probe.
    Case,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Case => write!(f, "case"),
        }
    }
}

/// Side of the absolute bound that was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Excursion {
    Low,
    High,
}

/// Conditions that halt the controller until the next power cycle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum FatalFault {
    /// A filtered temperature left its absolute safe range.
    SensorOutOfBounds {
        sensor: Sensor,
        excursion: Excursion,
        reading_c: f32,
    },
    /// The state machine was asked to run a state it does not know.
    /// Indicates a logic defect rather than a hardware problem.
    UnknownState(u8),
}

impl FatalFault {
    /// Numeric diagnostic code shown on the display while halted.
    pub const fn code(&self) -> u8 {
        match self {
            Self::SensorOutOfBounds {
                sensor: Sensor::Primary,
                excursion: Excursion::Low,
                ..
            } => 1,
            Self::SensorOutOfBounds {
                sensor: Sensor::Primary,
                excursion: Excursion::High,
                ..
            } => 2,
            Self::SensorOutOfBounds {
                sensor: Sensor::Case,
                excursion: Excursion::Low,
                ..
            } => 3,
            Self::SensorOutOfBounds {
                sensor: Sensor::Case,
                excursion: Excursion::High,
                ..
            } => 4,
            Self::UnknownState(_) => 9,
        }
    }
}

impl fmt::Display for FatalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorOutOfBounds {
                sensor,
                excursion,
                reading_c,
            } => {
                let side = match excursion {
                    Excursion::Low => "below",
                    Excursion::High => "above",
                };
                write!(
                    f,
                    "{sensor} temperature {reading_c:.1}\u{00b0}C {side} safe range (E{:02})",
                    self.code()
                )
            }
            Self::UnknownState(idx) => write!(f, "unknown state index {idx} (E{:02})", self.code()),
        }
    }
}

impl From<FatalFault> for Error {
    fn from(e: FatalFault) -> Self {
        Self::Fatal(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The config document could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed config document"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The GPIO behind a relay rejected the write.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
