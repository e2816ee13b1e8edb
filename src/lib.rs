#![allow(clippy::too_many_arguments)]

mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod simulation_time;
mod statistics;
#[cfg(test)]
mod tests;

#[macro_use]
extern crate is_close;

use crate::core::actuators::{resolve_actuation, ActuationDebug};
use crate::core::greenhouse::{simulate, SimulationError};
use crate::core::results::{RunSummary, TimestepRow};
use crate::errors::GreenhouseError;
use crate::input::{ingest_scenario, Scenario};
use crate::output::Output;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Read;
use tracing::info;

/// Outcome of a scenario run: summary, full time series and the actuation
/// fractions the commands were resolved to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvironmentEstimate {
    pub summary: RunSummary,
    pub rows: Vec<TimestepRow>,
    pub actuation_debug: ActuationDebug,
}

/// Resolve the scenario's actuator commands over its window and run the
/// greenhouse model with the resulting constant actuation.
pub fn estimate_environment(scenario: &Scenario) -> Result<EnvironmentEstimate, SimulationError> {
    let (actuation, actuation_debug) = resolve_actuation(
        &scenario.actuators,
        scenario.simulation_time.elapsed(),
        &scenario.mapping,
    );

    let result = simulate(
        &scenario.geometry,
        &scenario.outside,
        &scenario.initial,
        &scenario.building,
        &actuation,
        &scenario.coupling,
        &scenario.plant,
        &scenario.air,
        scenario.crop_area,
        &scenario.simulation_time,
    )?;

    Ok(EnvironmentEstimate {
        summary: result.summary,
        rows: result.rows,
        actuation_debug,
    })
}

pub fn run_project(
    input: impl Read,
    output: impl Output,
) -> Result<EnvironmentEstimate, GreenhouseError> {
    let scenario = ingest_scenario(input)?;

    let estimate = estimate_environment(&scenario)?;
    info!(
        rows = estimate.rows.len(),
        temp_air_final = estimate.summary.temp_air_final_c,
        rel_humidity_air_final = estimate.summary.rel_humidity_air_final_pct,
        "greenhouse run complete"
    );

    if !output.is_noop() {
        write_results_file(&output, "results", &estimate.rows)?;
        write_summary_file(&output, "summary", &estimate.summary)?;
    }

    Ok(estimate)
}

fn write_results_file(
    output: &impl Output,
    output_key: &str,
    rows: &[TimestepRow],
) -> Result<(), anyhow::Error> {
    info!("writing out to {output_key}");
    let writer = output.writer_for_location_key(output_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;

    Ok(())
}

fn write_summary_file(
    output: &impl Output,
    output_key: &str,
    summary: &RunSummary,
) -> Result<(), anyhow::Error> {
    info!("writing out to {output_key}");
    let writer = output.writer_for_location_key(output_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(["Quantity", "Value", "Unit"])?;
    for (quantity, value, unit) in summary.entries() {
        writer.write_record([quantity, value.to_string().as_str(), unit])?;
    }

    writer.flush()?;

    Ok(())
}
