//! Setpoint control laws.

pub mod case_target;

pub use case_target::CaseTargetController;
