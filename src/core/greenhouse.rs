//! Lumped single-zone greenhouse model: air, canopy and air moisture are
//! advanced together with a fixed-step explicit Euler scheme.

use crate::compare_floats::max_of_2;
use crate::core::actuators::ActuationResolved;
use crate::core::canopy::{
    canopy_to_air_convection, effective_leaf_area_index, net_radiation, stomatal_resistance,
    transpiration_power, vapour_exchange_coefficient,
};
use crate::core::psychrometrics::{
    absolute_humidity_from_rh, relative_humidity_from_absolute_humidity,
    saturation_vapour_pressure, vapour_pressure_from_absolute_humidity,
};
use crate::core::results::{RunSummary, SimulationResult, TimestepRow};
use crate::core::units::{
    air_changes_to_volume_flow, seconds_to_hours, watts_over_hours_to_kwh, SECONDS_PER_HOUR,
};
use crate::input::{
    AirProps, BaselinePlantParams, BuildingParams, CouplingParams, Geometry, Initial, Outside,
};
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use bitflags::bitflags;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Timestep must be positive and finite, got {0} s")]
    NonPositiveTimestep(f64),
    #[error("Elapsed time must be non-negative and finite, got {0} s")]
    NegativeElapsedTime(f64),
    #[error("Greenhouse {dimension} must be positive, got {value} m")]
    NonPositiveDimension {
        dimension: &'static str,
        value: f64,
    },
    #[error("Window of {elapsed} s holds too many steps of {step} s to simulate")]
    TooManySteps { step: f64, elapsed: f64 },
    #[error("Crop area must be positive, got {0} m2")]
    NonPositiveCropArea(f64),
    #[error("Zone state became non-finite at step {index} (t = {time_min} min)")]
    NonFiniteState { index: usize, time_min: f64 },
}

bitflags! {
    /// Processes acting on the zone during a step, in reporting order
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Triggers: u8 {
        const HEATER = 1;
        const SOLAR = 1 << 1;
        const VENTILATION = 1 << 2;
        const TRANSPIRATION = 1 << 3;
        const CANOPY_CONVECTION = 1 << 4;
    }
}

impl Triggers {
    /// Flags active for the whole run, independent of the zone state
    pub fn for_run(
        actuation: &ActuationResolved,
        outside: &Outside,
        coupling: &CouplingParams,
        crop_area: f64,
    ) -> Self {
        let mut triggers = Triggers::empty();
        triggers.set(Triggers::HEATER, actuation.heater_thermal_w > 0.);
        triggers.set(Triggers::SOLAR, outside.solar_irradiance > 0.);
        triggers.set(Triggers::VENTILATION, actuation.air_changes_per_hour > 0.);
        triggers.set(
            Triggers::CANOPY_CONVECTION,
            coupling.leaf_area_index > 0. && crop_area > 0.,
        );
        triggers
    }

    /// Labels of the set flags joined with `|`, or `none`
    pub fn label(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// State advanced by the integration, exclusively owned by one run
#[derive(Clone, Copy, Debug, PartialEq)]
struct SimulationState {
    temp_air: f64,
    temp_canopy: f64,
    abs_humidity_air: f64,
}

impl SimulationState {
    fn is_finite(&self) -> bool {
        self.temp_air.is_finite() && self.temp_canopy.is_finite() && self.abs_humidity_air.is_finite()
    }
}

/// Heat and moisture flows evaluated from the state at the start of a step
#[derive(Clone, Copy, Debug)]
struct StepFlows {
    /// in W
    transpiration: f64,
    /// in W
    convection_canopy_to_air: f64,
    /// in W/m2
    latent_vent: f64,
    /// in W
    envelope: f64,
    /// in W
    vent_sensible: f64,
    /// in W
    solar_air: f64,
    /// in W
    solar_canopy: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct EnergyUse {
    heater_gas_m3: f64,
    heater_elec_kwh: f64,
    cooling_elec_kwh: f64,
    vents_elec_kwh: f64,
}

impl EnergyUse {
    fn over_step(actuation: &ActuationResolved, timestep: f64) -> Self {
        let timestep_h = seconds_to_hours(timestep);
        Self {
            heater_gas_m3: actuation.heater_gas_m3_h * timestep_h,
            heater_elec_kwh: watts_over_hours_to_kwh(actuation.heater_elec_w, timestep_h),
            cooling_elec_kwh: watts_over_hours_to_kwh(actuation.cooling_elec_w, timestep_h),
            vents_elec_kwh: watts_over_hours_to_kwh(actuation.vents_elec_w, timestep_h),
        }
    }

    fn accumulate(&mut self, step: &EnergyUse) {
        self.heater_gas_m3 += step.heater_gas_m3;
        self.heater_elec_kwh += step.heater_elec_kwh;
        self.cooling_elec_kwh += step.cooling_elec_kwh;
        self.vents_elec_kwh += step.vents_elec_kwh;
    }
}

/// Greenhouse zone with everything that stays constant over a run pre-computed
struct GreenhouseZone<'a> {
    geometry: &'a Geometry,
    outside: &'a Outside,
    building: &'a BuildingParams,
    actuation: &'a ActuationResolved,
    coupling: &'a CouplingParams,
    plant: &'a BaselinePlantParams,
    air: &'a AirProps,
    volume: f64,
    floor_area: f64,
    crop_area: f64,
    /// effective leaf area index
    lai: f64,
    /// in kg/m3
    abs_humidity_outside: f64,
    /// in m3/s
    airflow: f64,
    /// in kg/s
    mass_flow: f64,
    run_triggers: Triggers,
}

impl<'a> GreenhouseZone<'a> {
    fn new(
        geometry: &'a Geometry,
        outside: &'a Outside,
        building: &'a BuildingParams,
        actuation: &'a ActuationResolved,
        coupling: &'a CouplingParams,
        plant: &'a BaselinePlantParams,
        air: &'a AirProps,
        crop_area: f64,
    ) -> Self {
        let volume = geometry.volume();
        let airflow = air_changes_to_volume_flow(actuation.air_changes_per_hour, volume);

        Self {
            geometry,
            outside,
            building,
            actuation,
            coupling,
            plant,
            air,
            volume,
            floor_area: geometry.floor_area(),
            crop_area,
            lai: effective_leaf_area_index(coupling),
            abs_humidity_outside: absolute_humidity_from_rh(
                outside.temp_air,
                outside.rel_humidity,
            ),
            airflow,
            mass_flow: air.density * airflow,
            run_triggers: Triggers::for_run(actuation, outside, coupling, crop_area),
        }
    }

    /// Moisture and heat flows for the current state
    fn flows(&self, state: &SimulationState) -> StepFlows {
        let vapour_pressure_sat = saturation_vapour_pressure(state.temp_air);
        let vapour_pressure =
            vapour_pressure_from_absolute_humidity(state.temp_air, state.abs_humidity_air);

        let r_n = net_radiation(self.coupling, self.outside.solar_irradiance);
        let r_s = stomatal_resistance(self.coupling, self.lai, r_n, state.temp_air);
        let vec = vapour_exchange_coefficient(self.coupling, self.air, self.lai, r_s);
        let transpiration = transpiration_power(
            self.coupling,
            vec,
            vapour_pressure_sat,
            vapour_pressure,
            self.crop_area,
        );
        let convection_canopy_to_air = canopy_to_air_convection(
            self.coupling,
            self.lai,
            self.crop_area,
            state.temp_canopy,
            state.temp_air,
        );

        let latent_vent = (self.actuation.air_changes_per_hour / SECONDS_PER_HOUR as f64)
            * self.geometry.height
            * self.coupling.latent_heat
            * (state.abs_humidity_air - self.abs_humidity_outside);

        let temp_diff_outside = self.outside.temp_air - state.temp_air;

        StepFlows {
            transpiration,
            convection_canopy_to_air,
            latent_vent,
            envelope: self.building.heat_loss_coefficient * temp_diff_outside,
            vent_sensible: self.mass_flow * self.air.specific_heat * temp_diff_outside,
            solar_air: self.building.solar_fraction_air
                * self.outside.solar_irradiance
                * self.floor_area,
            solar_canopy: self.building.solar_fraction_canopy
                * self.outside.solar_irradiance
                * self.floor_area,
        }
    }

    /// Advance the state by one step and return the flows that drove it.
    ///
    /// Humidity is updated first; both temperature balances use the flows
    /// evaluated from the state at the start of the step.
    fn advance(&self, state: &mut SimulationState, timestep: f64) -> StepFlows {
        let flows = self.flows(state);
        let height = self.geometry.height;
        let latent_heat = self.coupling.latent_heat;

        let d_abs_humidity = (timestep
            * ((flows.transpiration / self.crop_area) - flows.latent_vent))
            / (latent_heat * height);
        state.abs_humidity_air = max_of_2(0.0, state.abs_humidity_air + d_abs_humidity);

        let d_temp_air_dt = (flows.envelope
            + flows.vent_sensible
            + self.actuation.heater_thermal_w
            + flows.solar_air
            + flows.convection_canopy_to_air)
            / (self.air.density * self.air.specific_heat * self.volume);
        state.temp_air += d_temp_air_dt * timestep;

        let d_temp_canopy_dt =
            (flows.solar_canopy - flows.convection_canopy_to_air - flows.transpiration)
                / (self.plant.canopy_areal_heat_capacity * self.crop_area);
        state.temp_canopy += d_temp_canopy_dt * timestep;

        flows
    }

    fn row(
        &self,
        t_it: &SimulationTimeIteration,
        state: &SimulationState,
        rel_humidity_air: f64,
        flows: &StepFlows,
        energy_step: &EnergyUse,
        energy_cum: &EnergyUse,
    ) -> TimestepRow {
        let mut triggers = self.run_triggers;
        triggers.set(Triggers::TRANSPIRATION, flows.transpiration > 0.);

        TimestepRow {
            t_min: t_it.time_in_minutes(),
            temp_outside_c: self.outside.temp_air,
            temp_air_c: state.temp_air,
            temp_canopy_c: state.temp_canopy,
            abs_humidity_air: state.abs_humidity_air,
            rel_humidity_air_pct: rel_humidity_air,
            triggers: triggers.label(),
            airflow_m3_s: self.airflow,
            ach_1_h: self.actuation.air_changes_per_hour,
            transpiration_w: flows.transpiration,
            convection_canopy_to_air_w: flows.convection_canopy_to_air,
            latent_vent_w_m2: flows.latent_vent,
            envelope_w: flows.envelope,
            vent_sensible_w: flows.vent_sensible,
            solar_air_w: flows.solar_air,
            solar_canopy_w: flows.solar_canopy,
            heater_thermal_w: self.actuation.heater_thermal_w,
            heater_gas_m3_h_rate: self.actuation.heater_gas_m3_h,
            heater_elec_w_rate: self.actuation.heater_elec_w,
            cooling_elec_w_rate: self.actuation.cooling_elec_w,
            vents_elec_w_rate: self.actuation.vents_elec_w,
            heater_gas_m3_step: energy_step.heater_gas_m3,
            heater_elec_kwh_step: energy_step.heater_elec_kwh,
            cooling_elec_kwh_step: energy_step.cooling_elec_kwh,
            vents_elec_kwh_step: energy_step.vents_elec_kwh,
            heater_gas_m3_cum: energy_cum.heater_gas_m3,
            heater_elec_kwh_cum: energy_cum.heater_elec_kwh,
            cooling_elec_kwh_cum: energy_cum.cooling_elec_kwh,
            vents_elec_kwh_cum: energy_cum.vents_elec_kwh,
            cooling_total_elec_kwh_cum: energy_cum.cooling_elec_kwh + energy_cum.vents_elec_kwh,
            total_elec_kwh_cum: energy_cum.heater_elec_kwh
                + energy_cum.cooling_elec_kwh
                + energy_cum.vents_elec_kwh,
        }
    }
}

fn validate_run(
    geometry: &Geometry,
    crop_area: f64,
    simulation_time: &SimulationTime,
) -> Result<(), SimulationError> {
    let step = simulation_time.step();
    if !(step.is_finite() && step > 0.) {
        return Err(SimulationError::NonPositiveTimestep(step));
    }
    let elapsed = simulation_time.elapsed();
    if !(elapsed.is_finite() && elapsed >= 0.) {
        return Err(SimulationError::NegativeElapsedTime(elapsed));
    }
    if simulation_time.checked_iteration_count().is_none() {
        return Err(SimulationError::TooManySteps { step, elapsed });
    }
    for (dimension, value) in [
        ("length", geometry.length),
        ("width", geometry.width),
        ("height", geometry.height),
    ] {
        if !(value > 0.) {
            return Err(SimulationError::NonPositiveDimension { dimension, value });
        }
    }
    if !(crop_area > 0.) {
        return Err(SimulationError::NonPositiveCropArea(crop_area));
    }
    Ok(())
}

/// Run the coupled thermal-moisture model over the simulated window.
///
/// The row recorded at iteration k holds the state *after* that iteration's
/// update, so the first row (t = 0) already reflects one step of integration.
///
/// Arguments:
/// * `geometry` - greenhouse dimensions
/// * `outside` - outdoor conditions, constant for the run
/// * `initial` - initial air and canopy state
/// * `building` - envelope conductance and solar fractions
/// * `actuation` - resolved actuation, constant for the run
/// * `coupling` - canopy coupling parameters
/// * `plant` - canopy thermal mass
/// * `air` - air density and specific heat
/// * `crop_area` - cultivated area in m2, defaults to the floor area
/// * `simulation_time` - step length and elapsed window, in seconds
pub fn simulate(
    geometry: &Geometry,
    outside: &Outside,
    initial: &Initial,
    building: &BuildingParams,
    actuation: &ActuationResolved,
    coupling: &CouplingParams,
    plant: &BaselinePlantParams,
    air: &AirProps,
    crop_area: Option<f64>,
    simulation_time: &SimulationTime,
) -> Result<SimulationResult, SimulationError> {
    let crop_area = crop_area.unwrap_or_else(|| geometry.floor_area());
    validate_run(geometry, crop_area, simulation_time)?;

    let zone = GreenhouseZone::new(
        geometry, outside, building, actuation, coupling, plant, air, crop_area,
    );

    debug!(
        volume = zone.volume,
        floor_area = zone.floor_area,
        crop_area,
        airflow = zone.airflow,
        abs_humidity_outside = zone.abs_humidity_outside,
        iterations = simulation_time.iteration_count(),
        "starting greenhouse simulation"
    );

    let mut state = SimulationState {
        temp_air: initial.temp_air,
        temp_canopy: initial.temp_canopy,
        abs_humidity_air: absolute_humidity_from_rh(initial.temp_air, initial.rel_humidity),
    };
    let mut energy_cum = EnergyUse::default();
    let mut rows = vec![];

    for t_it in simulation_time.iter() {
        let flows = zone.advance(&mut state, t_it.timestep);
        if !state.is_finite() {
            return Err(SimulationError::NonFiniteState {
                index: t_it.index,
                time_min: t_it.time_in_minutes(),
            });
        }
        let rel_humidity_air =
            relative_humidity_from_absolute_humidity(state.temp_air, state.abs_humidity_air);

        let energy_step = EnergyUse::over_step(actuation, t_it.timestep);
        energy_cum.accumulate(&energy_step);

        trace!(
            index = t_it.index,
            temp_air = state.temp_air,
            temp_canopy = state.temp_canopy,
            rel_humidity_air,
            transpiration = flows.transpiration,
        );

        rows.push(zone.row(
            &t_it,
            &state,
            rel_humidity_air,
            &flows,
            &energy_step,
            &energy_cum,
        ));
    }

    let summary = RunSummary::from_rows(&rows, outside.temp_air);

    Ok(SimulationResult { rows, summary })
}
