//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It contains the time base, the latest filtered
//! temperatures, the adaptive case target, the active state's timer,
//! actuator outputs and configuration.  Think of it as the "blackboard"
//! in a blackboard architecture.  There are no globals; the service owns
//! exactly one context and lends it out by `&mut`.

use serde::Serialize;

use crate::config::ChillerConfig;
use crate::control::CaseTargetController;
use crate::timebase::{Tick, TimeBase};

// ---------------------------------------------------------------------------
// Temperature snapshot (read-only to state handlers; written by sensor hub)
// ---------------------------------------------------------------------------

/// Filtered temperatures for the current iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TemperatureSnapshot {
    /// Coolant temperature (°C).
    pub primary_c: f32,
    /// Enclosure temperature (°C).
    pub case_c: f32,
}

// ---------------------------------------------------------------------------
// Actuator outputs (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// The three duty-cycle outputs.  The pump is not part of the duty
/// cycle; it runs from bring-up until a halt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActuatorOutputs {
    pub compressor: bool,
    /// Bypass valve.
    pub solenoid: bool,
    pub fan: bool,
}

impl ActuatorOutputs {
    /// All outputs off: safe default.
    pub const OFF: Self = Self {
        compressor: false,
        solenoid: false,
        fan: false,
    };

    pub const fn new(compressor: bool, solenoid: bool, fan: bool) -> Self {
        Self {
            compressor,
            solenoid,
            fan,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-state timer payload
// ---------------------------------------------------------------------------

/// Timer owned by the active state.  Written only by the entry action of
/// the state that uses it, so no state ever reads a value left behind by
/// an unrelated visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateTimer {
    /// The active state is not timed.
    #[default]
    None,
    /// The state ends once `elapsed_seconds` reaches this value.
    Deadline(u32),
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Whole-second time base.  Idle may reset its counter.
    pub time: TimeBase,
    /// Result of this iteration's time base tick.
    pub clock: Tick,
    /// `elapsed_seconds` when the current state was entered.
    pub entered_at_secs: u32,
    /// Timer payload of the current state.
    pub timer: StateTimer,

    // -- Sensor data --
    /// Latest filtered temperatures.  Updated before each FSM tick.
    pub temps: TemperatureSnapshot,

    // -- Setpoints --
    /// Adaptive case-temperature target.
    pub case_target: CaseTargetController,

    // -- Actuator outputs --
    /// Outputs to be written after the FSM tick.
    pub outputs: ActuatorOutputs,

    // -- Configuration --
    pub config: ChillerConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.  The time base
    /// starts at clock zero until [`restart_clock`](Self::restart_clock).
    pub fn new(config: ChillerConfig) -> Self {
        Self {
            time: TimeBase::starting_at(0),
            clock: Tick::default(),
            entered_at_secs: 0,
            timer: StateTimer::None,
            temps: TemperatureSnapshot::default(),
            case_target: CaseTargetController::new(&config),
            outputs: ActuatorOutputs::OFF,
            config,
        }
    }

    /// Re-anchor the time base at `now_ms` with the counter at zero.
    pub fn restart_clock(&mut self, now_ms: u32) {
        self.time = TimeBase::starting_at(now_ms);
        self.clock = Tick::default();
        self.entered_at_secs = 0;
    }

    /// Advance the time base and record the result.
    pub fn advance_clock(&mut self, now_ms: u32) -> Tick {
        self.clock = self.time.tick(now_ms);
        self.clock
    }

    /// Zero the second counter (Idle housekeeping).
    pub fn reset_clock(&mut self) {
        self.time.reset_elapsed();
        self.clock.elapsed_seconds = 0;
        self.entered_at_secs = 0;
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.clock.elapsed_seconds
    }

    /// Whole seconds since the current state was entered.
    pub fn secs_in_state(&self) -> u32 {
        self.elapsed_secs().wrapping_sub(self.entered_at_secs)
    }

    /// Arm the current state's timer `duration_secs` from now.
    pub fn arm_timer(&mut self, duration_secs: u32) {
        self.timer = StateTimer::Deadline(self.elapsed_secs().wrapping_add(duration_secs));
    }

    /// Seconds left on the current state's timer; zero once expired or
    /// when the state is not timed.
    pub fn remaining_secs(&self) -> u32 {
        match self.timer {
            StateTimer::Deadline(at) => at.saturating_sub(self.elapsed_secs()),
            StateTimer::None => 0,
        }
    }

    pub fn timer_expired(&self) -> bool {
        self.remaining_secs() == 0
    }
}
