//! Environment Source contract and the per-step snapshot it produces.

use std::fmt;

use crate::error::Result;

/// Hour and minute within the simulated day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: usize,
    pub minute: usize,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Environmental readings for one step, shared read-only by every unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvironmentSnapshot {
    /// Air temperature around the tanks (°C).
    pub ambient_temperature: f64,
    /// Cold-water supply temperature (°C).
    pub inlet_temperature: f64,
    /// Hot-water draw rate (gal/h).
    pub demand_volume: f64,
    pub step_index: usize,
    /// Whole hours elapsed since step 0.
    pub hour_of_run: usize,
    pub day: usize,
    pub time_of_day: TimeOfDay,
}

/// Supplies time-indexed environment data and the scheduling events the hub
/// reacts to.
///
/// Implementations are synchronised to one step at a time with
/// [`EnvironmentSource::sync_to`]; every other accessor describes that step.
pub trait EnvironmentSource {
    /// Moves to `step`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EnvironmentRange` if there is no data for `step`.
    fn sync_to(&mut self, step: usize) -> Result<()>;

    /// Snapshot for the current step.
    fn snapshot(&self) -> &EnvironmentSnapshot;

    fn ambient_temperature(&self) -> f64 {
        self.snapshot().ambient_temperature
    }

    fn inlet_temperature(&self) -> f64 {
        self.snapshot().inlet_temperature
    }

    fn demand_volume(&self) -> f64 {
        self.snapshot().demand_volume
    }

    /// Start of a high-demand period.
    fn is_at_peak_boundary(&self) -> bool;

    /// End of a high-demand period.
    fn is_at_non_peak_boundary(&self) -> bool;

    /// Inside the staged reactivation window that follows a non-peak boundary.
    fn is_in_reactivation_period(&self) -> bool;

    /// First step of a reactivation zone.
    fn is_at_zone_boundary(&self) -> bool;

    /// Index of the reactivation zone the current step falls in.
    fn reactivation_zone_index(&self) -> usize;

    /// Configured reactivation duration in hours. Zero disables staged reactivation.
    fn reactivation_hours(&self) -> usize;

    /// Number of zones the reactivation period is divided into.
    fn reactivation_zone_count(&self) -> usize;
}
