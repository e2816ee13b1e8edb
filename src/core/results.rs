use crate::statistics::{final_value, mean};
use serde::Serialize;
use tracing::warn;

/// Snapshot of the zone after one integration step
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimestepRow {
    /// minutes from the start of the window
    pub t_min: f64,
    pub temp_outside_c: f64,
    pub temp_air_c: f64,
    pub temp_canopy_c: f64,
    /// in kg/m3
    pub abs_humidity_air: f64,
    pub rel_humidity_air_pct: f64,
    pub triggers: String,
    pub airflow_m3_s: f64,
    pub ach_1_h: f64,

    // instantaneous heat and moisture flows
    pub transpiration_w: f64,
    pub convection_canopy_to_air_w: f64,
    pub latent_vent_w_m2: f64,
    pub envelope_w: f64,
    pub vent_sensible_w: f64,
    pub solar_air_w: f64,
    pub solar_canopy_w: f64,

    // actuator rates
    pub heater_thermal_w: f64,
    pub heater_gas_m3_h_rate: f64,
    pub heater_elec_w_rate: f64,
    pub cooling_elec_w_rate: f64,
    pub vents_elec_w_rate: f64,

    // consumption during this step
    pub heater_gas_m3_step: f64,
    pub heater_elec_kwh_step: f64,
    pub cooling_elec_kwh_step: f64,
    pub vents_elec_kwh_step: f64,

    // consumption up to and including this step
    pub heater_gas_m3_cum: f64,
    pub heater_elec_kwh_cum: f64,
    pub cooling_elec_kwh_cum: f64,
    pub vents_elec_kwh_cum: f64,
    pub cooling_total_elec_kwh_cum: f64,
    pub total_elec_kwh_cum: f64,
}

/// Final and average quantities of a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub temp_outside_c: f64,
    pub temp_air_final_c: f64,
    pub rel_humidity_air_final_pct: f64,
    pub airflow_final_m3_s: f64,
    pub airflow_avg_m3_s: f64,
    pub ach_final_1_h: f64,
    pub ach_avg_1_h: f64,
    pub heater_gas_total_m3: f64,
    pub heater_elec_total_kwh: f64,
    pub cooling_elec_total_kwh: f64,
    pub vents_elec_total_kwh: f64,
    pub total_elec_kwh: f64,
}

impl RunSummary {
    /// Reduce a time-ascending row sequence into the run summary.
    ///
    /// Every quantity of an empty sequence is 0.0, apart from the outdoor
    /// temperature, which is a run input.
    pub fn from_rows(rows: &[TimestepRow], temp_outside_c: f64) -> Self {
        let airflow: Vec<f64> = rows.iter().map(|row| row.airflow_m3_s).collect();
        let ach: Vec<f64> = rows.iter().map(|row| row.ach_1_h).collect();

        let summary = match rows.last() {
            Some(last) => Self {
                temp_outside_c,
                temp_air_final_c: last.temp_air_c,
                rel_humidity_air_final_pct: last.rel_humidity_air_pct,
                airflow_final_m3_s: final_value(&airflow),
                airflow_avg_m3_s: mean(&airflow),
                ach_final_1_h: final_value(&ach),
                ach_avg_1_h: mean(&ach),
                heater_gas_total_m3: last.heater_gas_m3_cum,
                heater_elec_total_kwh: last.heater_elec_kwh_cum,
                cooling_elec_total_kwh: last.cooling_elec_kwh_cum,
                vents_elec_total_kwh: last.vents_elec_kwh_cum,
                total_elec_kwh: last.heater_elec_kwh_cum
                    + last.cooling_elec_kwh_cum
                    + last.vents_elec_kwh_cum,
            },
            None => Self {
                temp_outside_c,
                ..Default::default()
            },
        };

        // actuation is resolved once per run, so these can only diverge by rounding
        if !is_close!(
            summary.airflow_final_m3_s,
            summary.airflow_avg_m3_s,
            rel_tol = 1e-9,
            abs_tol = 1e-12
        ) || !is_close!(
            summary.ach_final_1_h,
            summary.ach_avg_1_h,
            rel_tol = 1e-9,
            abs_tol = 1e-12
        ) {
            warn!(
                airflow_final = summary.airflow_final_m3_s,
                airflow_avg = summary.airflow_avg_m3_s,
                ach_final = summary.ach_final_1_h,
                ach_avg = summary.ach_avg_1_h,
                "final and average airflow or ACH differ for a constant-actuation run"
            );
        }

        summary
    }

    /// Summary entries with their units, in reporting order
    pub fn entries(&self) -> [(&'static str, f64, &'static str); 12] {
        [
            ("Outside temperature", self.temp_outside_c, "[deg C]"),
            ("Inside temperature final", self.temp_air_final_c, "[deg C]"),
            ("Inside RH final", self.rel_humidity_air_final_pct, "[%]"),
            ("Airflow final", self.airflow_final_m3_s, "[m3/s]"),
            ("Airflow average", self.airflow_avg_m3_s, "[m3/s]"),
            ("ACH final", self.ach_final_1_h, "[1/h]"),
            ("ACH average", self.ach_avg_1_h, "[1/h]"),
            ("Heater gas total", self.heater_gas_total_m3, "[m3]"),
            ("Heater electricity total", self.heater_elec_total_kwh, "[kWh]"),
            ("Cooling electricity total", self.cooling_elec_total_kwh, "[kWh]"),
            ("Vents electricity total", self.vents_elec_total_kwh, "[kWh]"),
            ("Total electricity", self.total_elec_kwh, "[kWh]"),
        ]
    }
}

/// Per-step rows and summary of one greenhouse run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    pub rows: Vec<TimestepRow>,
    pub summary: RunSummary,
}
