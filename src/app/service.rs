//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, sensor filters, safety monitor and the
//! shared context.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService         │
//! ActuatorPort ◀──│  Filters · FSM · Safety   │ ──▶ DisplayPort
//!                 └──────────────────────────┘
//! ```
//!
//! One call to [`AppService::tick`] is one loop iteration:
//! time base → acquisition → transition → safety → outputs → presentation.

use log::info;

use crate::config::ChillerConfig;
use crate::display::frame_for;
use crate::error::{self, FatalFault};
use crate::fsm::context::{ActuatorOutputs, FsmContext, TemperatureSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateDescriptor, StateId, Transition};
use crate::safety::SafetyMonitor;
use crate::sensors::{RawReadings, SensorHub};

use super::events::{AppEvent, TelemetryRecord};
use super::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort};

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopStatus {
    Running,
    /// The controller is halted for the rest of the power cycle.
    Halted(FatalFault),
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    sensors: SensorHub,
    safety: SafetyMonitor,
    /// Elapsed seconds since the last telemetry record.
    secs_since_telemetry: u32,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** start the FSM: settle the sensors, run
    /// [`precheck`](Self::precheck), then call [`start`](Self::start).
    pub fn new(config: ChillerConfig) -> error::Result<Self> {
        Self::with_table(config, build_state_table())
    }

    /// Construct around an explicit state table.  A table whose rows are
    /// out of order fails with [`FatalFault::UnknownState`].
    pub fn with_table(config: ChillerConfig, table: [StateDescriptor; StateId::COUNT]) -> error::Result<Self> {
        config.validate()?;
        let fsm = Fsm::new(table, StateId::Idle)?;
        let sensors = SensorHub::new(&config);
        let safety = SafetyMonitor::new(&config);
        let ctx = FsmContext::new(config);

        Ok(Self {
            fsm,
            ctx,
            sensors,
            safety,
            secs_since_telemetry: 0,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Feed one bring-up sample through the filters without running the
    /// control logic.
    pub fn settle(&mut self, raw: RawReadings) -> TemperatureSnapshot {
        self.ctx.temps = self.sensors.update(raw);
        self.ctx.temps
    }

    /// Bounds check on the settled temperatures, before any load runs.
    /// A failure halts exactly like a failure inside the loop.
    pub fn precheck(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) -> Result<(), FatalFault> {
        let temps = self.ctx.temps;
        match self.safety.check(temps.primary_c, temps.case_c) {
            Ok(()) => {
                info!(
                    "Pre-check passed: coolant {:.1}°C, case {:.1}°C",
                    temps.primary_c, temps.case_c
                );
                Ok(())
            }
            Err(fault) => {
                self.halt(fault, hw, sink);
                Err(fault)
            }
        }
    }

    /// Start the control loop in Idle with the second counter at zero.
    pub fn start(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.ctx.restart_clock(now_ms);
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full loop iteration.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]: this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
    ) -> LoopStatus {
        if let Some(fault) = self.safety.latched() {
            hw.all_off();
            return LoopStatus::Halted(fault);
        }
        self.tick_count += 1;

        // 1. Time base
        let clock = self.ctx.advance_clock(now_ms);

        // 2. Acquisition
        self.ctx.temps = self.sensors.update(hw.read_raw());

        // 3. Transition evaluation
        let case_target_before = self.ctx.case_target.target_c();
        let transition = self.fsm.tick(&mut self.ctx);

        // 4. Safety
        let temps = self.ctx.temps;
        if let Err(fault) = self.safety.check(temps.primary_c, temps.case_c) {
            self.halt(fault, hw, sink);
            return LoopStatus::Halted(fault);
        }

        // 5. Outputs, re-written every iteration
        hw.write_outputs(self.ctx.outputs);

        // 6. Presentation
        if let Some(Transition { from, to }) = transition {
            sink.emit(&AppEvent::StateChanged { from, to });
            if from == StateId::Cooldown && to == StateId::Idle {
                sink.emit(&AppEvent::CaseTargetAdapted {
                    from_c: case_target_before,
                    to_c: self.ctx.case_target.target_c(),
                });
            }
        }

        if clock.tick_occurred {
            display.show(&frame_for(
                self.ctx.elapsed_secs(),
                self.ctx.config.display_temperature_every_secs,
                self.fsm.current_state(),
                temps.primary_c,
            ));

            self.secs_since_telemetry += 1;
            if self.secs_since_telemetry >= self.ctx.config.telemetry_interval_secs {
                self.secs_since_telemetry = 0;
                sink.emit(&AppEvent::Telemetry(self.telemetry()));
            }
        }

        LoopStatus::Running
    }

    // ── Queries ───────────────────────────────────────────────

    /// Telemetry record built from the current context.
    pub fn telemetry(&self) -> TelemetryRecord {
        let cfg = &self.ctx.config;
        TelemetryRecord {
            primary_c: self.ctx.temps.primary_c,
            case_c: self.ctx.temps.case_c,
            target_c: cfg.target_temp_c,
            start_threshold_c: cfg.start_threshold_c(),
            case_target_c: self.ctx.case_target.target_c(),
            state: self.fsm.current_state(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn temperatures(&self) -> TemperatureSnapshot {
        self.ctx.temps
    }

    pub fn outputs(&self) -> ActuatorOutputs {
        self.ctx.outputs
    }

    pub fn case_target_c(&self) -> f32 {
        self.ctx.case_target.target_c()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.ctx.elapsed_secs()
    }

    /// The fault that halted the controller, if any.
    pub fn halted(&self) -> Option<FatalFault> {
        self.safety.latched()
    }

    /// Loop iterations executed since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &ChillerConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn halt(&mut self, fault: FatalFault, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.safety.latch(fault);
        self.ctx.outputs = ActuatorOutputs::OFF;
        hw.all_off();
        sink.emit(&AppEvent::Halted(fault));
    }
}
