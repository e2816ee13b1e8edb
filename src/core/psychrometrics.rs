//! This module provides the moist-air conversions used by the greenhouse zone
//! model: saturation vapour pressure (Magnus-Tetens) and the ideal-gas link
//! between vapour pressure and absolute humidity.
//!
//! The greenhouse integration calls these on every step, so the constants
//! and the order of operations are fixed and must not be rearranged.

use crate::compare_floats::clamp_percent;
use crate::core::units::celsius_to_kelvin;

/// Specific gas constant of water vapour, in J/(kg.K)
pub const GAS_CONSTANT_WATER_VAPOUR: f64 = 461.5;

// Magnus-Tetens coefficients
const MAGNUS_PRESSURE: f64 = 610.94; // Pa
const MAGNUS_A: f64 = 17.625;
const MAGNUS_B: f64 = 243.04; // degC

/// Saturation vapour pressure over water, in Pa
///
/// Arguments:
/// * `temp_c` - air temperature, in deg C
pub fn saturation_vapour_pressure(temp_c: f64) -> f64 {
    MAGNUS_PRESSURE * ((MAGNUS_A * temp_c) / (MAGNUS_B + temp_c)).exp()
}

/// Absolute humidity (kg of vapour per m3 of air) at a given temperature and relative humidity
///
/// Arguments:
/// * `temp_c` - air temperature, in deg C
/// * `rel_humidity` - relative humidity, in %
pub fn absolute_humidity_from_rh(temp_c: f64, rel_humidity: f64) -> f64 {
    let vapour_pressure_sat = saturation_vapour_pressure(temp_c);
    let temp_k = celsius_to_kelvin(temp_c);
    vapour_pressure_sat * (rel_humidity / 100.0) / (temp_k * GAS_CONSTANT_WATER_VAPOUR)
}

/// Relative humidity (%) of air holding `abs_humidity` kg/m3 of vapour, clamped to [0, 100]
pub fn relative_humidity_from_absolute_humidity(temp_c: f64, abs_humidity: f64) -> f64 {
    let vapour_pressure_sat = saturation_vapour_pressure(temp_c);
    let temp_k = celsius_to_kelvin(temp_c);
    let rel_humidity =
        100.0 * abs_humidity * temp_k * GAS_CONSTANT_WATER_VAPOUR / vapour_pressure_sat;
    clamp_percent(rel_humidity)
}

/// Partial pressure of water vapour (Pa) for air holding `abs_humidity` kg/m3 of vapour
pub fn vapour_pressure_from_absolute_humidity(temp_c: f64, abs_humidity: f64) -> f64 {
    let temp_k = celsius_to_kelvin(temp_c);
    abs_humidity * temp_k * GAS_CONSTANT_WATER_VAPOUR
}
