pub mod actuators;
pub mod canopy;
pub mod greenhouse;
pub mod psychrometrics;
pub mod results;
pub mod units;
