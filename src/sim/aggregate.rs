//! Per-step population statistics.

use crate::devices::{PowerMode, PowerState};

use super::division::Partition;
use super::environment::EnvironmentSnapshot;
use super::types::{AggregateRecord, ControllerSnapshot};

/// Temperature statistics over one subset of the population.
///
/// An empty subset yields zero for every statistic rather than an error, so
/// aggregation is total over every comms/non-comms split.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubsetStats {
    pub count: usize,
    pub on: usize,
    pub mean: f64,
    /// Population standard deviation (divisor N).
    pub pstdev: f64,
    pub min: f64,
    pub max: f64,
}

impl SubsetStats {
    /// Computes statistics over `members`.
    pub fn from_snapshots<'a>(members: impl IntoIterator<Item = &'a ControllerSnapshot>) -> Self {
        let mut count = 0_usize;
        let mut on = 0_usize;
        let mut temps = Vec::new();
        for snap in members {
            count += 1;
            if snap.on_state == PowerState::On {
                on += 1;
            }
            temps.push(snap.temperature);
        }
        let (mean, pstdev) = mean_and_pstdev(&temps);
        let (min, max) = extrema(&temps);
        Self {
            count,
            on,
            mean,
            pstdev,
            min,
            max,
        }
    }
}

/// Mean and population standard deviation; `(0, 0)` for an empty slice.
pub fn mean_and_pstdev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Median; `0` for an empty slice. Even-length input averages the middle pair.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// `(min, max)`; `(0, 0)` for an empty slice.
pub fn extrema(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Summarises one step's controller snapshots into an [`AggregateRecord`].
///
/// `snapshots[i]` must belong to population member `i` of `partition`.
pub fn aggregate(
    env: &EnvironmentSnapshot,
    snapshots: &[ControllerSnapshot],
    partition: &Partition,
) -> AggregateRecord {
    let temps: Vec<f64> = snapshots.iter().map(|s| s.temperature).collect();
    let demands: Vec<f64> = snapshots.iter().map(|s| s.demand).collect();

    let all = SubsetStats::from_snapshots(snapshots);
    let comms = SubsetStats::from_snapshots(partition.comms().iter().map(|&i| &snapshots[i]));
    let non_comms =
        SubsetStats::from_snapshots(partition.non_comms().iter().map(|&i| &snapshots[i]));
    let total_low = snapshots
        .iter()
        .filter(|s| s.power_mode == PowerMode::Low)
        .count();
    let (demand, _) = mean_and_pstdev(&demands);

    AggregateRecord {
        time_step: env.step_index,
        temperature: all.mean,
        total_on: all.on,
        total_low,
        inlet: env.inlet_temperature,
        ambient: env.ambient_temperature,
        demand,
        temp_pstdev: all.pstdev,
        temp_median: median(&temps),
        temp_lowest: all.min,
        temp_highest: all.max,
        comms_on: comms.on,
        non_comms_on: non_comms.on,
        total_population_size: all.count,
        total_comms_population_size: comms.count,
        comms_temps_mean: comms.mean,
        comms_temps_pstdev: comms.pstdev,
        comms_temps_lowest: comms.min,
        comms_temps_highest: comms.max,
        non_comms_mean: non_comms.mean,
        non_comms_temps_pstdev: non_comms.pstdev,
        non_comms_temps_lowest: non_comms.min,
        non_comms_temps_highest: non_comms.max,
    }
}
