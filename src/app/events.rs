//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::error::FatalFault;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The adaptive case target moved at the end of a cooling cycle.
    CaseTargetAdapted { from_c: f32, to_c: f32 },

    /// Periodic telemetry record.
    Telemetry(TelemetryRecord),

    /// A fatal fault halted the controller.
    Halted(FatalFault),
}

/// One telemetry record.  Field order is the wire order of the serial
/// log: primary, case, target, start threshold, case target, state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub primary_c: f32,
    pub case_c: f32,
    pub target_c: f32,
    pub start_threshold_c: f32,
    pub case_target_c: f32,
    pub state: StateId,
}
