/// A simple statistics module with reductions over per-timestep series.
use statrs::statistics::Statistics;

/// Last value of a series, or 0.0 for an empty series
pub fn final_value(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(0.0)
}

/// Arithmetic mean of a series, or 0.0 for an empty series
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.mean()
}
