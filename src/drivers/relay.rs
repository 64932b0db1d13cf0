//! Relay driver over an `embedded-hal` output pin.
//!
//! Every load on the board (compressor, bypass solenoid, fan, pump,
//! buzzer) is a plain on/off output.  [`Relay`] is generic over
//! [`OutputPin`] so host tests drive it with mock pins; on the target the
//! pin is a [`GpioOutput`] backed by the raw ESP-IDF GPIO calls in
//! [`hw_init`](super::hw_init).

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin, PinState};

use crate::error::ActuatorError;

use super::hw_init;

/// One relay-driven load.
pub struct Relay<P> {
    pin: P,
    label: &'static str,
    energised: bool,
}

impl<P: OutputPin> Relay<P> {
    pub fn new(pin: P, label: &'static str) -> Self {
        Self {
            pin,
            label,
            energised: false,
        }
    }

    /// Drive the pin.  The cached state only changes when the write
    /// succeeds.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.energised = on;
        Ok(())
    }

    /// Last successfully written state.
    pub fn is_on(&self) -> bool {
        self.energised
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

// ── Raw GPIO pin ──────────────────────────────────────────────

/// ESP-IDF error code from a failed `gpio_set_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioWriteError(pub i32);

impl digital::Error for GpioWriteError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin configured by [`hw_init::init_peripherals`].
#[derive(Debug, Clone, Copy)]
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioOutput {
    type Error = GpioWriteError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioWriteError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioWriteError)
    }
}
