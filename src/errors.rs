use crate::core::greenhouse::SimulationError;
use crate::input::InputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GreenhouseError {
    #[error("Scenario was considered invalid due to error: {0}")]
    InvalidScenario(#[from] InputError),
    #[error("Error identified during greenhouse calculation: {0}")]
    FailureInCalculation(#[from] SimulationError),
    #[error("Error while writing results: {0}")]
    ErrorInOutput(#[from] anyhow::Error),
}
