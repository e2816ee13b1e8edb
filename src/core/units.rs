pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub(crate) const CELSIUS_TO_KELVIN_OFFSET: f64 = 273.15;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + CELSIUS_TO_KELVIN_OFFSET
}

/// Convert a step length in seconds into hours
pub(crate) fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR as f64
}

/// Energy (kWh) drawn by a constant electrical load over a duration in hours
pub(crate) fn watts_over_hours_to_kwh(power_w: f64, duration_h: f64) -> f64 {
    (power_w / WATTS_PER_KILOWATT as f64) * duration_h
}

/// Convert an air change rate (1/h) for a given air volume (m3) into a volumetric flow (m3/s)
pub(crate) fn air_changes_to_volume_flow(air_changes_per_hour: f64, volume: f64) -> f64 {
    air_changes_per_hour * volume / SECONDS_PER_HOUR as f64
}
