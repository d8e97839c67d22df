//! Population simulator for electric storage water heaters under
//! demand-response hub control.

pub mod config;
pub mod devices;
pub mod error;
/// CSV output and profile input.
pub mod io;
/// Hub, controllers, environment and aggregation.
pub mod sim;
pub mod telemetry;

pub use error::{Error, Result};
