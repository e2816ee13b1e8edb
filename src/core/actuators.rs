//! Resolution of vent, fan and heater commands into the physical quantities
//! seen by the greenhouse zone model (air change rate, heater output) and the
//! energy rates used for consumption bookkeeping.

use crate::compare_floats::clamp_fraction;
use crate::input::{ActuatorCommand, ActuatorMapping, ActuatorSet};
use serde::Serialize;

/// Physical actuation held constant for the whole simulated window
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ActuationResolved {
    /// air changes per hour
    pub air_changes_per_hour: f64,
    /// heater thermal output to the air, in W
    pub heater_thermal_w: f64,
    /// in m3/h
    pub heater_gas_m3_h: f64,
    /// in W
    pub heater_elec_w: f64,
    /// in W
    pub cooling_elec_w: f64,
    /// in W
    pub vents_elec_w: f64,
}

impl ActuationResolved {
    /// Actuation with only airflow and heating set; all energy rates are zero
    pub fn new(air_changes_per_hour: f64, heater_thermal_w: f64) -> Self {
        Self {
            air_changes_per_hour,
            heater_thermal_w,
            ..Default::default()
        }
    }

    pub fn total_elec_w(&self) -> f64 {
        self.heater_elec_w + self.cooling_elec_w + self.vents_elec_w
    }
}

/// Intermediate values of the resolution, reported alongside run results
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ActuationDebug {
    pub vents_effective: f64,
    pub fans_effective: f64,
    pub heater_effective: f64,
    pub air_changes_per_hour: f64,
    pub heater_thermal_w: f64,
}

impl ActuatorCommand {
    /// Fraction of the window for which the actuator is active, in [0, 1]
    pub fn duty(&self, elapsed_s: f64) -> f64 {
        if elapsed_s <= 0. {
            return 0.;
        }
        clamp_fraction(self.active_time_s / elapsed_s)
    }

    /// Activity level as a fraction, in [0, 1]
    pub fn activity_fraction(&self) -> f64 {
        clamp_fraction(self.activity_pct / 100.0)
    }

    /// Combined on/off, activity and duty fraction
    pub fn effective_fraction(&self, elapsed_s: f64) -> f64 {
        let on = if self.on { 1.0 } else { 0.0 };
        on * self.activity_fraction() * self.duty(elapsed_s)
    }
}

/// Scale actuator commands by the mapping maxima.
///
/// Vents and fans both contribute to the air change rate; fans also carry the
/// cooling electricity.
pub fn resolve_actuation(
    actuators: &ActuatorSet,
    elapsed_s: f64,
    mapping: &ActuatorMapping,
) -> (ActuationResolved, ActuationDebug) {
    let vents_effective = actuators.vents.effective_fraction(elapsed_s);
    let fans_effective = actuators.fans.effective_fraction(elapsed_s);
    let heater_effective = actuators.heater.effective_fraction(elapsed_s);

    let air_changes_per_hour =
        mapping.base_ach_vents * vents_effective + mapping.base_ach_fans * fans_effective;
    let heater_thermal_w = mapping.heater_max_w * heater_effective;

    let resolved = ActuationResolved {
        air_changes_per_hour,
        heater_thermal_w,
        heater_gas_m3_h: mapping.heater_max_gas_m3_h * heater_effective,
        heater_elec_w: mapping.heater_aux_elec_max_w * heater_effective,
        cooling_elec_w: mapping.cooling_fans_max_elec_w * fans_effective,
        vents_elec_w: mapping.vents_motor_max_elec_w * vents_effective,
    };

    let debug = ActuationDebug {
        vents_effective,
        fans_effective,
        heater_effective,
        air_changes_per_hour,
        heater_thermal_w,
    };

    (resolved, debug)
}
