//! NTC thermistor conversion and exponential smoothing.
//!
//! Each probe is a 10 kOhm NTC wired as the high side of a divider with a
//! fixed 10 kOhm resistor, read through a 10-bit ADC.  The three-term
//! Steinhart-Hart equation converts resistance to absolute temperature:
//!
//! ```text
//! 1/T = A + B·ln(R) + C·ln(R)³
//! ```
//!
//! Readings that cannot come from a connected probe (open or shorted
//! divider) convert to absolute zero.  That is far below every safety
//! bound, so the safety monitor halts the controller instead of letting
//! a NaN slip through its range checks.

/// Full-scale ADC count.
pub const ADC_MAX: u16 = 1023;
/// Fixed resistor in the divider.
pub const SERIES_RESISTOR_OHMS: f32 = 10_000.0;
/// Kelvin to Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;
/// Returned for open/short-circuit readings.
pub const ABSOLUTE_ZERO_C: f32 = -KELVIN_OFFSET;

const SH_A: f32 = 1.009_249_522e-3;
const SH_B: f32 = 2.378_405_444e-4;
const SH_C: f32 = 2.019_202_697e-7;

/// Convert a raw ADC reading to degrees Celsius.
pub fn raw_to_celsius(raw: u16) -> f32 {
    if raw == 0 || raw >= ADC_MAX {
        return ABSOLUTE_ZERO_C;
    }
    let resistance = SERIES_RESISTOR_OHMS * (f32::from(ADC_MAX) / f32::from(raw) - 1.0);
    let ln_r = resistance.ln();
    let inv_t = SH_A + SH_B * ln_r + SH_C * ln_r * ln_r * ln_r;
    if !inv_t.is_finite() || inv_t <= 0.0 {
        return ABSOLUTE_ZERO_C;
    }
    1.0 / inv_t - KELVIN_OFFSET
}

/// Raw ADC reading a probe at `celsius` would produce.
///
/// Closed-form inverse of the Steinhart-Hart equation, used by the
/// simulator and tests.  Computed in `f64`: the cube roots below cancel
/// most of their magnitude.
pub fn raw_for_celsius(celsius: f32) -> u16 {
    let (a, b, c) = (f64::from(SH_A), f64::from(SH_B), f64::from(SH_C));
    let kelvin = f64::from(celsius) + f64::from(KELVIN_OFFSET);
    if kelvin <= 0.0 {
        return 0;
    }
    let y = (a - 1.0 / kelvin) / c;
    let x = ((b / (3.0 * c)).powi(3) + y * y / 4.0).sqrt();
    let ln_r = (x - y / 2.0).cbrt() - (x + y / 2.0).cbrt();
    let ratio = ln_r.exp() / f64::from(SERIES_RESISTOR_OHMS);
    let raw = f64::from(ADC_MAX) / (ratio + 1.0);
    raw.round().clamp(1.0, f64::from(ADC_MAX - 1)) as u16
}

/// One probe's exponentially smoothed temperature.
///
/// The first sample seeds the filter directly; every later sample moves
/// the value `1/(weight+1)` of the way toward the new reading.
#[derive(Debug, Clone, Copy)]
pub struct FilteredTemperature {
    weight: f32,
    value: Option<f32>,
}

impl FilteredTemperature {
    pub fn new(weight: u16) -> Self {
        Self {
            weight: f32::from(weight),
            value: None,
        }
    }

    /// Feed one raw ADC sample and return the filtered temperature.
    pub fn update(&mut self, raw: u16) -> f32 {
        self.update_celsius(raw_to_celsius(raw))
    }

    /// Feed an already converted sample.
    pub fn update_celsius(&mut self, sample_c: f32) -> f32 {
        let next = match self.value {
            None => sample_c,
            Some(old) => (old * self.weight + sample_c) / (self.weight + 1.0),
        };
        self.value = Some(next);
        next
    }
}
