use crate::core::units::SECONDS_PER_MINUTE;
use serde::Deserialize;
use serde_valid::Validate;

pub const DEFAULT_STEP_SECONDS: f64 = 60.;
pub const DEFAULT_ELAPSED_SECONDS: f64 = 600.;

/// Fixed-step time axis for a run, in seconds from the start of the window.
///
/// The axis always yields `step_count() + 1` iterations, so a window shorter
/// than a single step still produces one iteration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationTime {
    #[serde(default = "default_step")]
    #[validate(exclusive_minimum = 0.)]
    step: f64,
    #[validate(minimum = 0.)]
    elapsed: f64,
}

fn default_step() -> f64 {
    DEFAULT_STEP_SECONDS
}

impl SimulationTime {
    pub fn new(step: f64, elapsed: f64) -> Self {
        Self { step, elapsed }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of whole steps that fit into the elapsed window
    pub fn step_count(&self) -> usize {
        (self.elapsed / self.step).floor() as usize
    }

    /// Iterations the axis yields, or `None` when the window holds more
    /// steps than can be counted
    pub fn checked_iteration_count(&self) -> Option<usize> {
        let steps = (self.elapsed / self.step).floor();
        if !(steps.is_finite() && steps < usize::MAX as f64) {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    pub fn iteration_count(&self) -> usize {
        self.step_count().saturating_add(1)
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(*self)
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_SECONDS, DEFAULT_ELAPSED_SECONDS)
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    iteration_count: usize,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            iteration_count: simulation_time.iteration_count(),
            simulation_time,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimulationTimeIteration {
    pub index: usize,
    /// seconds from the start of the window
    pub time: f64,
    /// step length in seconds
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn time_in_minutes(&self) -> f64 {
        self.time / SECONDS_PER_MINUTE as f64
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.iteration_count {
            return None;
        }
        let index = self.current_index;
        self.current_index += 1;
        Some(SimulationTimeIteration {
            index,
            time: index as f64 * self.simulation_time.step,
            timestep: self.simulation_time.step,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.iteration_count - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SimulationTimeIterator {}
