//! Device models for the water-heater population.

pub mod types;
/// Lumped-capacitance electric storage water heater.
pub mod water_heater;

pub use types::{PowerMode, PowerState, TankConfig, TankSize};
pub use water_heater::WaterHeater;
