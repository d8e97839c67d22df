//! Post-hoc run summary computed from aggregate records.

use std::fmt;

use serde::Serialize;

use super::controller::Controller;
use super::hub::RunOutcome;
use super::types::AggregateRecord;

/// Headline figures for a finished (or stopped) run.
///
/// Computed post-hoc from the record log so the summary always agrees with
/// the persisted output.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// How the run ended (`completed`, `interrupted`, `environment_exhausted`).
    pub outcome: String,
    /// Number of steps simulated.
    pub steps: usize,
    pub population_size: usize,
    /// Largest number of heaters ON in any step.
    pub peak_on: usize,
    /// Step at which `peak_on` first occurred.
    pub peak_on_step: Option<usize>,
    /// Average number of heaters ON per step.
    pub mean_on: f64,
    /// Average population mean temperature (°C).
    pub mean_temperature: f64,
    /// Coldest unit temperature seen in any step (°C).
    pub min_temperature: f64,
    /// Sum over steps of units in LOW mode.
    pub low_unit_steps: usize,
    /// Population total of steps spent ON.
    pub total_time_on: u64,
    /// Population total of state-change energy (kWh).
    pub total_energy_used: f64,
}

impl RunSummary {
    /// Builds the summary from the record log and the final population state.
    pub fn from_records(
        records: &[AggregateRecord],
        population: &[Controller],
        outcome: RunOutcome,
    ) -> Self {
        let total_time_on: u64 = population
            .iter()
            .map(|c| c.heater().total_time_on())
            .sum();
        let total_energy_used: f64 = population
            .iter()
            .map(|c| c.heater().total_energy_used())
            .sum();

        if records.is_empty() {
            return Self {
                outcome: outcome.label().to_string(),
                steps: 0,
                population_size: population.len(),
                peak_on: 0,
                peak_on_step: None,
                mean_on: 0.0,
                mean_temperature: 0.0,
                min_temperature: 0.0,
                low_unit_steps: 0,
                total_time_on,
                total_energy_used,
            };
        }

        let n = records.len() as f64;
        let mut peak_on = 0_usize;
        let mut peak_on_step = None;
        let mut on_sum = 0_usize;
        let mut temp_sum = 0.0_f64;
        let mut min_temperature = f64::INFINITY;
        let mut low_unit_steps = 0_usize;

        for r in records {
            if peak_on_step.is_none() || r.total_on > peak_on {
                peak_on = r.total_on;
                peak_on_step = Some(r.time_step);
            }
            on_sum += r.total_on;
            temp_sum += r.temperature;
            min_temperature = min_temperature.min(r.temp_lowest);
            low_unit_steps += r.total_low;
        }

        Self {
            outcome: outcome.label().to_string(),
            steps: records.len(),
            population_size: population.len(),
            peak_on,
            peak_on_step,
            mean_on: on_sum as f64 / n,
            mean_temperature: temp_sum / n,
            min_temperature,
            low_unit_steps,
            total_time_on,
            total_energy_used,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Outcome:               {}", self.outcome)?;
        writeln!(f, "Steps simulated:       {}", self.steps)?;
        writeln!(f, "Population:            {}", self.population_size)?;
        match self.peak_on_step {
            Some(step) => writeln!(f, "Peak ON count:         {} (step {step})", self.peak_on)?,
            None => writeln!(f, "Peak ON count:         {}", self.peak_on)?,
        }
        writeln!(f, "Mean ON count:         {:.2}", self.mean_on)?;
        writeln!(f, "Mean temperature:      {:.2} C", self.mean_temperature)?;
        writeln!(f, "Min temperature:       {:.2} C", self.min_temperature)?;
        writeln!(f, "LOW unit-steps:        {}", self.low_unit_steps)?;
        writeln!(f, "Total time ON:         {} steps", self.total_time_on)?;
        write!(f, "State-change energy:   {:.3} kWh", self.total_energy_used)
    }
}
