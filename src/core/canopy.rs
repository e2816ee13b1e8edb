//! Crop canopy coupling: stomatal resistance, transpiration and canopy-air
//! convection for a lumped canopy node.

use crate::compare_floats::max_of_2;
use crate::input::{AirProps, CouplingParams};

/// Lower bound applied to the leaf area index wherever it divides or scales a flux
pub const MIN_LEAF_AREA_INDEX: f64 = 1e-6;

// Stomatal resistance model coefficients
const R_S_MIN: f64 = 82.0; // s/m
const R_S_LIGHT_RANGE: f64 = 570.0; // s/m
const R_S_TEMP_COEFF: f64 = 0.023; // 1/K2
const R_S_TEMP_OPT: f64 = 20.0; // degC

pub fn effective_leaf_area_index(coupling: &CouplingParams) -> f64 {
    max_of_2(MIN_LEAF_AREA_INDEX, coupling.leaf_area_index)
}

/// Net radiation at the canopy (W/m2), proportional to solar irradiance
pub fn net_radiation(coupling: &CouplingParams, solar_irradiance: f64) -> f64 {
    coupling.net_radiation_gain * solar_irradiance
}

/// Stomatal resistance, in s/m
///
/// Arguments:
/// * `coupling` - canopy coupling parameters
/// * `lai` - effective leaf area index
/// * `net_radiation` - in W/m2
/// * `temp_air` - in deg C
pub fn stomatal_resistance(
    coupling: &CouplingParams,
    lai: f64,
    net_radiation: f64,
    temp_air: f64,
) -> f64 {
    R_S_MIN
        + R_S_LIGHT_RANGE
            * (-(coupling.transpiration_coefficient * net_radiation) / lai).exp()
            * (1.0 + R_S_TEMP_COEFF * (temp_air - R_S_TEMP_OPT).powi(2))
}

/// Vapour exchange coefficient between canopy and air, in kg/(m2.s.Pa)
pub fn vapour_exchange_coefficient(
    coupling: &CouplingParams,
    air: &AirProps,
    lai: f64,
    stomatal_resistance: f64,
) -> f64 {
    (2.0 * air.specific_heat * air.density * lai)
        / (coupling.latent_heat
            * coupling.psychrometric_constant
            * (coupling.boundary_layer_resistance + stomatal_resistance))
}

/// Latent heat flow (W) carried by transpiration over the crop area.
///
/// Only a positive vapour pressure deficit drives transpiration.
pub fn transpiration_power(
    coupling: &CouplingParams,
    vapour_exchange_coefficient: f64,
    vapour_pressure_sat: f64,
    vapour_pressure: f64,
    crop_area: f64,
) -> f64 {
    coupling.latent_heat
        * vapour_exchange_coefficient
        * max_of_2(0.0, vapour_pressure_sat - vapour_pressure)
        * crop_area
}

/// Convective heat flow from canopy to air, in W
pub fn canopy_to_air_convection(
    coupling: &CouplingParams,
    lai: f64,
    crop_area: f64,
    temp_canopy: f64,
    temp_air: f64,
) -> f64 {
    let h_canopy_air = coupling.h_per_lai * lai;
    h_canopy_air * crop_area * (temp_canopy - temp_air)
}
