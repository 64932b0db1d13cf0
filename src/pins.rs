//! GPIO / peripheral pin assignments for the chiller controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Relay outputs (opto-isolated relay board, active HIGH)
// ---------------------------------------------------------------------------

/// Compressor contactor.
pub const COMPRESSOR_GPIO: i32 = 1;
/// Hot-gas bypass solenoid valve.
pub const SOLENOID_GPIO: i32 = 2;
/// Condenser fan.
pub const FAN_GPIO: i32 = 3;
/// Coolant circulation pump.
pub const PUMP_GPIO: i32 = 4;

/// Piezo buzzer (driven transistor, active HIGH).
pub const BUZZER_GPIO: i32 = 11;

/// Every digital output, in bring-up order.
pub const OUTPUT_GPIOS: [i32; 5] = [
    COMPRESSOR_GPIO,
    SOLENOID_GPIO,
    FAN_GPIO,
    PUMP_GPIO,
    BUZZER_GPIO,
];

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Coolant NTC thermistor: 10 kΩ @ 25 °C, high side of a 10 kΩ divider.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const PRIMARY_ADC_CHANNEL: u32 = 4;

/// Enclosure NTC thermistor, same divider.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const CASE_ADC_CHANNEL: u32 = 8;
