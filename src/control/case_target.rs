//! Adaptive case-temperature target.
//!
//! Runs once per full cooling cycle, on the Cooldown -> Idle edge, and
//! pulls the enclosure setpoint a quarter of the way toward the observed
//! case temperature plus a small upward margin:
//!
//! ```text
//! target' = min((3·target + case + margin) / 4, ceiling)
//! ```

use crate::config::ChillerConfig;

/// Adaptive case-temperature setpoint
#[derive(Debug, Clone, Copy)]
pub struct CaseTargetController {
    target_c: f32,
    margin_c: f32,
    ceiling_c: f32,
}

impl CaseTargetController {
    pub fn new(config: &ChillerConfig) -> Self {
        Self::with_target(
            config.initial_case_target_c,
            config.case_target_margin_c,
            config.case_target_ceiling_c,
        )
    }

    /// Explicit parameters; the starting target is clamped to the ceiling.
    pub fn with_target(target_c: f32, margin_c: f32, ceiling_c: f32) -> Self {
        Self {
            target_c: target_c.min(ceiling_c),
            margin_c,
            ceiling_c,
        }
    }

    /// Fold one cycle's case temperature into the target and return it.
    pub fn adapt(&mut self, case_c: f32) -> f32 {
        let blended = (3.0 * self.target_c + case_c + self.margin_c) / 4.0;
        // `f32::min` ignores a NaN operand, so a NaN blend yields the ceiling.
        self.target_c = blended.min(self.ceiling_c);
        self.target_c
    }

    pub fn target_c(&self) -> f32 {
        self.target_c
    }
}
