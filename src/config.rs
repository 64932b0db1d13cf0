//! System configuration parameters
//!
//! All tunable parameters for the chiller controller.  Values are
//! compiled in; the host simulator may override them from a JSON file.
//! Nothing here is persisted or reconfigurable at runtime.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChillerConfig {
    // --- Setpoints ---
    /// Coolant target temperature (Celsius)
    pub target_temp_c: f32,
    /// Margin above target before a new cooling cycle starts (Celsius)
    pub hysteresis_c: f32,
    /// Case temperature target at power-on (Celsius)
    pub initial_case_target_c: f32,
    /// Upper limit the adaptive case target may never exceed (Celsius)
    pub case_target_ceiling_c: f32,
    /// Upward bias applied on every case-target adaptation (Celsius)
    pub case_target_margin_c: f32,
    /// Rise above target that sends Holding back to Cooling (Celsius)
    pub holding_reentry_offset_c: f32,

    // --- Duty cycle timing ---
    /// Compressor + bypass spin-up before active cooling (seconds)
    pub starting_duration_secs: u32,
    /// Minimum time in Cooling before Holding may be entered (seconds)
    pub cooling_min_dwell_secs: u32,
    /// Maximum time spent in Holding (seconds)
    pub holding_duration_secs: u32,
    /// Holding may not bail back to Cooling during its first seconds
    pub holding_min_dwell_secs: u32,
    /// Fan-only rest period after a cooling cycle (seconds)
    pub cooldown_duration_secs: u32,
    /// Idle resets the second counter once it reaches this value
    pub idle_clock_reset_secs: u32,

    // --- Filtering ---
    /// EMA history weight for the coolant probe (new = (old*w + x)/(w+1))
    pub primary_filter_weight: u16,
    /// EMA history weight for the case probe
    pub case_filter_weight: u16,

    // --- Safety ---
    /// Absolute coolant range (Celsius); leaving it halts the controller
    pub primary_min_c: f32,
    pub primary_max_c: f32,
    /// Absolute case range (Celsius)
    pub case_min_c: f32,
    pub case_max_c: f32,

    // --- Presentation ---
    /// Telemetry record interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Show the coolant temperature instead of the state every N seconds
    pub display_temperature_every_secs: u32,

    // --- Timing ---
    /// Idle delay at the end of every loop iteration (milliseconds)
    pub loop_delay_ms: u32,
    /// Sensor samples taken during bring-up before the bounds pre-check
    pub settle_samples: u16,
    /// Delay between bring-up samples (milliseconds)
    pub settle_interval_ms: u32,
    /// How long each actuator is pulsed during the bring-up self-test
    pub actuator_test_ms: u32,
}

impl Default for ChillerConfig {
    fn default() -> Self {
        Self {
            // Setpoints
            target_temp_c: 16.0,
            hysteresis_c: 0.8,
            initial_case_target_c: 25.0,
            case_target_ceiling_c: 30.0,
            case_target_margin_c: 2.0,
            holding_reentry_offset_c: 0.2,

            // Duty cycle
            starting_duration_secs: 3,
            cooling_min_dwell_secs: 5,
            holding_duration_secs: 600, // 10 min
            holding_min_dwell_secs: 5,
            cooldown_duration_secs: 60,
            idle_clock_reset_secs: 3600,

            // Filtering
            primary_filter_weight: 199, // ~200 sample time constant
            case_filter_weight: 99,     // ~100 sample time constant

            // Safety
            primary_min_c: 3.0,
            primary_max_c: 50.0,
            case_min_c: 3.0,
            case_max_c: 55.0,

            // Presentation
            telemetry_interval_secs: 1,
            display_temperature_every_secs: 5,

            // Timing
            loop_delay_ms: 50,
            settle_samples: 20,
            settle_interval_ms: 100,
            actuator_test_ms: 500,
        }
    }
}

impl ChillerConfig {
    /// Temperature above which a new cooling cycle starts.
    pub fn start_threshold_c(&self) -> f32 {
        self.target_temp_c + self.hysteresis_c
    }

    /// Reject parameter sets that would make the controller unsafe or
    /// meaningless.  Values are never clamped silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.target_temp_c,
            self.hysteresis_c,
            self.initial_case_target_c,
            self.case_target_ceiling_c,
            self.case_target_margin_c,
            self.holding_reentry_offset_c,
            self.primary_min_c,
            self.primary_max_c,
            self.case_min_c,
            self.case_max_c,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("temperatures must be finite"));
        }
        if self.primary_min_c >= self.primary_max_c || self.case_min_c >= self.case_max_c {
            return Err(ConfigError::ValidationFailed("safety bounds inverted"));
        }
        if self.hysteresis_c <= 0.0 {
            return Err(ConfigError::ValidationFailed("hysteresis must be positive"));
        }
        let low = self.target_temp_c - self.hysteresis_c;
        if low <= self.primary_min_c || self.start_threshold_c() >= self.primary_max_c {
            return Err(ConfigError::ValidationFailed(
                "target band must sit inside the primary safety bounds",
            ));
        }
        if self.case_target_ceiling_c > self.case_max_c {
            return Err(ConfigError::ValidationFailed(
                "case target ceiling above case safety maximum",
            ));
        }
        if self.initial_case_target_c > self.case_target_ceiling_c {
            return Err(ConfigError::ValidationFailed("initial case target above ceiling"));
        }
        if self.starting_duration_secs == 0
            || self.holding_duration_secs == 0
            || self.cooldown_duration_secs == 0
        {
            return Err(ConfigError::ValidationFailed("state durations must be non-zero"));
        }
        if self.holding_min_dwell_secs >= self.holding_duration_secs {
            return Err(ConfigError::ValidationFailed(
                "holding dwell must be shorter than holding duration",
            ));
        }
        if self.idle_clock_reset_secs == 0 {
            return Err(ConfigError::ValidationFailed("idle clock reset must be non-zero"));
        }
        if self.telemetry_interval_secs == 0 || self.display_temperature_every_secs == 0 {
            return Err(ConfigError::ValidationFailed("presentation intervals must be non-zero"));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON document on top of the defaults and
    /// validate the result.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}
