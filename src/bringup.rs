//! Power-on bring-up sequence.
//!
//! ```text
//!  all off ─▶ settle filters ─▶ bounds pre-check ─▶ pulse each load ─▶ pump on
//!                                     │
//!                                     └─ out of range: halt, never returns to the loop
//! ```
//!
//! Runs once before the control loop; the caller starts the loop with
//! [`AppService::start`] when this returns `Ok`.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::{Actuator, ActuatorPort, EventSink, SensorPort};
use crate::app::service::AppService;
use crate::error::FatalFault;
use crate::fsm::context::TemperatureSnapshot;

/// Loads pulsed during the self-test, in order.
pub const SELF_TEST_ORDER: [Actuator; 4] = [
    Actuator::Compressor,
    Actuator::Solenoid,
    Actuator::Fan,
    Actuator::Pump,
];

/// Run the bring-up sequence and return the settled temperatures.
pub fn run(
    app: &mut AppService,
    hw: &mut (impl SensorPort + ActuatorPort),
    delay: &mut impl DelayNs,
    sink: &mut impl EventSink,
) -> Result<TemperatureSnapshot, FatalFault> {
    let cfg = app.config();
    let (samples, interval_ms, pulse_ms) = (cfg.settle_samples, cfg.settle_interval_ms, cfg.actuator_test_ms);

    hw.all_off();

    // Let the filters converge before anything is judged.
    let mut settled = TemperatureSnapshot::default();
    for _ in 0..samples.max(1) {
        settled = app.settle(hw.read_raw());
        delay.delay_ms(interval_ms);
    }
    info!(
        "Bring-up: settled after {} samples, coolant {:.1}°C, case {:.1}°C",
        samples.max(1),
        settled.primary_c,
        settled.case_c
    );

    app.precheck(hw, sink)?;

    for actuator in SELF_TEST_ORDER {
        info!("Bring-up: testing {actuator:?}");
        hw.set(actuator, true);
        delay.delay_ms(pulse_ms);
        hw.set(actuator, false);
    }

    hw.set(Actuator::Pump, true);
    info!("Bring-up: complete, pump running");
    Ok(settled)
}
