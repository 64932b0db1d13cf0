//! Terminal alarm presentation.
//!
//! Once the safety monitor trips, the driver loop stops calling the
//! service and instead polls a [`HaltPresenter`] forever.  The presenter
//! is a pure function of time since the halt, so it can be tested
//! without blocking:
//!
//! ```text
//!  t (ms)   0      500     1000    1500    2000    2500 ...
//!  buzzer   on     off     on      off     on      off
//!  display  Err    Err     Err     Err     E 0x    E 0x ...
//! ```

use crate::app::ports::{Actuator, ActuatorPort, DisplayPort};
use crate::display::DisplayFrame;
use crate::error::FatalFault;

/// Buzzer half-period.
pub const TONE_TOGGLE_MS: u32 = 500;
/// Time each alarm screen stays up.
pub const DISPLAY_ROTATE_MS: u32 = 2000;

/// Buzzer and display state at one instant of the halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltFrame {
    pub tone_on: bool,
    pub frame: DisplayFrame,
}

#[derive(Debug, Clone, Copy)]
pub struct HaltPresenter {
    fault: FatalFault,
    halted_at_ms: u32,
}

impl HaltPresenter {
    pub fn new(fault: FatalFault, halted_at_ms: u32) -> Self {
        Self { fault, halted_at_ms }
    }

    pub fn fault(&self) -> FatalFault {
        self.fault
    }

    /// What to present at `now_ms`.  Survives clock wraparound.
    pub fn frame_at(&self, now_ms: u32) -> HaltFrame {
        let since = now_ms.wrapping_sub(self.halted_at_ms);
        HaltFrame {
            tone_on: (since / TONE_TOGGLE_MS) % 2 == 0,
            frame: DisplayFrame::Alarm {
                code: self.fault.code(),
                show_code: (since / DISPLAY_ROTATE_MS) % 2 == 1,
            },
        }
    }

    /// Present the frame for `now_ms`: every load off, buzzer and
    /// display per the alarm pattern.  Called once per driver iteration.
    pub fn drive(&self, now_ms: u32, hw: &mut impl ActuatorPort, display: &mut impl DisplayPort) -> HaltFrame {
        let frame = self.frame_at(now_ms);
        for actuator in Actuator::ALL {
            hw.set(actuator, false);
        }
        hw.set_buzzer(frame.tone_on);
        display.show(&frame.frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Excursion, Sensor};

    fn presenter(at: u32) -> HaltPresenter {
        HaltPresenter::new(
            FatalFault::SensorOutOfBounds {
                sensor: Sensor::Primary,
                excursion: Excursion::High,
                reading_c: 50.4,
            },
            at,
        )
    }

    #[test]
    fn tone_toggles_every_half_second() {
        let p = presenter(10_000);
        assert!(p.frame_at(10_000).tone_on);
        assert!(p.frame_at(10_499).tone_on);
        assert!(!p.frame_at(10_500).tone_on);
        assert!(p.frame_at(11_000).tone_on);
    }

    #[test]
    fn display_rotates_err_and_code() {
        let p = presenter(0);
        let at = |ms| match p.frame_at(ms).frame {
            DisplayFrame::Alarm { code, show_code } => (code, show_code),
            other => panic!("unexpected frame {other:?}"),
        };
        assert_eq!(at(0), (2, false));
        assert_eq!(at(1999), (2, false));
        assert_eq!(at(2000), (2, true));
        assert_eq!(at(4000), (2, false));
    }

    #[test]
    fn presentation_survives_clock_wrap() {
        let p = presenter(u32::MAX - 99);
        assert!(!p.frame_at(400).tone_on);
    }
}
