use crate::simulation_time::SimulationTime;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::{BufReader, Read};
use thiserror::Error;

pub fn ingest_scenario(json: impl Read) -> Result<Scenario, InputError> {
    let scenario: Scenario = serde_json::from_reader(BufReader::new(json))?;
    scenario
        .validate()
        .map_err(|errors| InputError::Validation(errors.to_string()))?;

    Ok(scenario)
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Scenario could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Scenario failed validation: {0}")]
    Validation(String),
}

/// A complete what-if scenario: the greenhouse, its surroundings, the crop
/// and the actuator commands held for the whole simulated window.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[validate]
    pub geometry: Geometry,
    #[validate]
    pub outside: Outside,
    pub initial: Initial,
    pub building: BuildingParams,
    pub coupling: CouplingParams,
    #[serde(default)]
    #[validate]
    pub air: AirProps,
    #[serde(default)]
    pub plant: BaselinePlantParams,
    /// cultivated area, in m2; the floor area is used when absent
    pub crop_area: Option<f64>,
    pub actuators: ActuatorSet,
    #[serde(default)]
    pub mapping: ActuatorMapping,
    #[validate]
    pub simulation_time: SimulationTime,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Geometry {
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub length: f64,
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub width: f64,
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub height: f64,
}

impl Geometry {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Air volume, in m3
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Floor area, in m2
    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }
}

/// Outdoor conditions, held constant for the run
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Outside {
    /// in deg C
    pub temp_air: f64,
    /// in %
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub rel_humidity: f64,
    /// shortwave irradiance proxy, in W/m2
    #[validate(minimum = 0.)]
    pub solar_irradiance: f64,
}

impl Outside {
    pub fn new(temp_air: f64, rel_humidity: f64, solar_irradiance: f64) -> Self {
        Self {
            temp_air,
            rel_humidity,
            solar_irradiance,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Initial {
    /// in deg C
    pub temp_air: f64,
    /// in %
    pub rel_humidity: f64,
    /// in deg C
    pub temp_canopy: f64,
}

impl Initial {
    pub fn new(temp_air: f64, rel_humidity: f64, temp_canopy: f64) -> Self {
        Self {
            temp_air,
            rel_humidity,
            temp_canopy,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct AirProps {
    /// in kg/m3
    #[validate(exclusive_minimum = 0.)]
    pub density: f64,
    /// in J/(kg.K)
    #[validate(exclusive_minimum = 0.)]
    pub specific_heat: f64,
}

impl Default for AirProps {
    fn default() -> Self {
        Self {
            density: 1.20,
            specific_heat: 1006.0,
        }
    }
}

/// Canopy coupling parameters for transpiration and canopy-air convection
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CouplingParams {
    pub leaf_area_index: f64,
    /// canopy-air convective coefficient per unit LAI, in W/(m2.K)
    #[serde(default = "default_h_per_lai")]
    pub h_per_lai: f64,
    /// latent heat of vaporisation, in J/kg
    #[serde(default = "default_latent_heat")]
    pub latent_heat: f64,
    /// psychrometric constant, in Pa/K
    #[serde(default = "default_psychrometric_constant")]
    pub psychrometric_constant: f64,
    /// boundary-layer resistance, in s/m
    #[serde(default = "default_boundary_layer_resistance")]
    pub boundary_layer_resistance: f64,
    /// light response parameter of the stomatal resistance
    #[serde(default = "default_transpiration_coefficient")]
    pub transpiration_coefficient: f64,
    /// ratio of net radiation at the canopy to solar irradiance
    #[serde(default = "default_net_radiation_gain")]
    pub net_radiation_gain: f64,
}

fn default_h_per_lai() -> f64 {
    10.0
}

fn default_latent_heat() -> f64 {
    2.45e6
}

fn default_psychrometric_constant() -> f64 {
    66.0
}

fn default_boundary_layer_resistance() -> f64 {
    200.0
}

fn default_transpiration_coefficient() -> f64 {
    0.7
}

fn default_net_radiation_gain() -> f64 {
    0.70
}

impl CouplingParams {
    pub fn new(leaf_area_index: f64) -> Self {
        Self {
            leaf_area_index,
            h_per_lai: default_h_per_lai(),
            latent_heat: default_latent_heat(),
            psychrometric_constant: default_psychrometric_constant(),
            boundary_layer_resistance: default_boundary_layer_resistance(),
            transpiration_coefficient: default_transpiration_coefficient(),
            net_radiation_gain: default_net_radiation_gain(),
        }
    }
}

/// Envelope and solar distribution of the greenhouse
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildingParams {
    /// lumped envelope conductance, in W/K
    pub heat_loss_coefficient: f64,
    /// fraction of solar irradiance absorbed by the air node
    pub solar_fraction_air: f64,
    /// fraction of solar irradiance absorbed by the canopy node
    pub solar_fraction_canopy: f64,
}

impl BuildingParams {
    pub fn new(
        heat_loss_coefficient: f64,
        solar_fraction_air: f64,
        solar_fraction_canopy: f64,
    ) -> Self {
        Self {
            heat_loss_coefficient,
            solar_fraction_air,
            solar_fraction_canopy,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BaselinePlantParams {
    /// effective canopy thermal mass per unit crop area, in J/(m2.K)
    pub canopy_areal_heat_capacity: f64,
}

impl Default for BaselinePlantParams {
    fn default() -> Self {
        Self {
            canopy_areal_heat_capacity: 30_000.0,
        }
    }
}

/// Command for a single actuator over the simulated window
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActuatorCommand {
    pub on: bool,
    /// in %, values outside 0-100 are clamped
    pub activity_pct: f64,
    /// time the actuator is active during the window, in seconds
    pub active_time_s: f64,
}

impl ActuatorCommand {
    pub fn new(on: bool, activity_pct: f64, active_time_s: f64) -> Self {
        Self {
            on,
            activity_pct,
            active_time_s,
        }
    }

    pub fn off() -> Self {
        Self::new(false, 0., 0.)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActuatorSet {
    pub vents: ActuatorCommand,
    pub fans: ActuatorCommand,
    pub heater: ActuatorCommand,
}

/// Maximum ratings used to scale actuator commands into physical quantities
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ActuatorMapping {
    /// air changes per hour with vents fully open for the whole window
    pub base_ach_vents: f64,
    /// air changes per hour with fans at full activity for the whole window
    pub base_ach_fans: f64,
    /// heater thermal output to the air, in W
    pub heater_max_w: f64,
    /// heater fuel use, in m3/h of natural gas
    pub heater_max_gas_m3_h: f64,
    /// heater auxiliary electricity (controls, pump, ignition fan), in W
    pub heater_aux_elec_max_w: f64,
    /// fan electricity, in W
    pub cooling_fans_max_elec_w: f64,
    /// vent motor electricity, in W
    pub vents_motor_max_elec_w: f64,
}

impl Default for ActuatorMapping {
    fn default() -> Self {
        Self {
            base_ach_vents: 3.0,
            base_ach_fans: 6.0,
            heater_max_w: 20_000.0,
            heater_max_gas_m3_h: 2.5,
            heater_aux_elec_max_w: 300.0,
            cooling_fans_max_elec_w: 1500.0,
            vents_motor_max_elec_w: 0.0,
        }
    }
}
