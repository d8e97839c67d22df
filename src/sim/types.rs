//! Core simulation types: run settings, controller snapshots, and the
//! per-step aggregate record.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::devices::{PowerMode, PowerState};
use crate::error::{Error, Result};
use crate::sim::division::DivisionStrategy;

/// Whether hot-water draw reaches the heat balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandMode {
    /// Units see zero draw; only standby losses cool the tanks.
    Disabled,
    /// Units see the environment's draw rate scaled per household.
    Profile,
}

impl FromStr for DemandMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::Disabled),
            "profile" => Ok(Self::Profile),
            other => Err(Error::Configuration(format!(
                "unknown demand mode \"{other}\", expected \"none\" or \"profile\""
            ))),
        }
    }
}

/// Settings the hub consumes for one run.
///
/// # Examples
///
/// ```
/// use ewh_sim::sim::types::HubSettings;
///
/// let settings = HubSettings::new(0, Some(48), 7);
/// assert_eq!(settings.hub_interval, 1);
/// assert!(settings.comms_enabled);
/// ```
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// First step simulated.
    pub start_step: usize,
    /// Exclusive last step, `None` runs until stopped or out of data.
    pub end_step: Option<usize>,
    /// Steps between scheduling decisions (> 0).
    pub hub_interval: usize,
    /// `false` disables all signalling for the run.
    pub comms_enabled: bool,
    pub division: DivisionStrategy,
    /// Size (or cap) parameter handed to the division strategy.
    pub division_size: usize,
    pub demand_mode: DemandMode,
    /// Seed for comms-subset sampling.
    pub seed: u64,
}

impl HubSettings {
    /// Creates settings with hub interval 1, comms enabled, no comms subset,
    /// and demand disabled.
    pub fn new(start_step: usize, end_step: Option<usize>, seed: u64) -> Self {
        Self {
            start_step,
            end_step,
            hub_interval: 1,
            comms_enabled: true,
            division: DivisionStrategy::NoComms,
            division_size: 0,
            demand_mode: DemandMode::Disabled,
            seed,
        }
    }
}

/// Read-only view of one controller after its step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    pub id: usize,
    /// Water temperature (°C).
    pub temperature: f64,
    pub on_state: PowerState,
    pub power_mode: PowerMode,
    pub total_time_on: u64,
    pub total_energy_used: f64,
    /// Draw rate this unit saw during the step (gal/h).
    pub demand: f64,
}

/// Population statistics for one step. Field names and order form the
/// persisted CSV schema; rows are written through `Serialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub time_step: usize,
    /// Mean temperature over the whole population (°C).
    pub temperature: f64,
    pub total_on: usize,
    /// Units in LOW mode, regardless of subset.
    pub total_low: usize,
    pub inlet: f64,
    pub ambient: f64,
    /// Mean per-unit draw (gal/h).
    pub demand: f64,
    pub temp_pstdev: f64,
    pub temp_median: f64,
    pub temp_lowest: f64,
    pub temp_highest: f64,
    pub comms_on: usize,
    pub non_comms_on: usize,
    pub total_population_size: usize,
    pub total_comms_population_size: usize,
    pub comms_temps_mean: f64,
    pub comms_temps_pstdev: f64,
    pub comms_temps_lowest: f64,
    pub comms_temps_highest: f64,
    pub non_comms_mean: f64,
    pub non_comms_temps_pstdev: f64,
    pub non_comms_temps_lowest: f64,
    pub non_comms_temps_highest: f64,
}

impl fmt::Display for AggregateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>5} | mean={:>6.2}°C sd={:.2} [{:.2}, {:.2}] | on={:>4} low={:>4} | \
             comms(n={}, on={}, mean={:.2}) non-comms(on={}, mean={:.2}) | \
             ambient={:.1} inlet={:.1} demand={:.2}",
            self.time_step,
            self.temperature,
            self.temp_pstdev,
            self.temp_lowest,
            self.temp_highest,
            self.total_on,
            self.total_low,
            self.total_comms_population_size,
            self.comms_on,
            self.comms_temps_mean,
            self.non_comms_on,
            self.non_comms_mean,
            self.ambient,
            self.inlet,
            self.demand,
        )
    }
}
