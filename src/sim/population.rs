//! Population construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::devices::{TankConfig, WaterHeater};
use crate::error::{Error, Result};

use super::controller::Controller;

/// Where each unit's starting temperature comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialTemperature {
    /// Ambient air temperature at the start step.
    Ambient,
    /// Fixed temperature (°C).
    Fixed(f64),
}

/// Parameters for building a homogeneous population.
#[derive(Debug, Clone)]
pub struct PopulationSpec {
    pub size: usize,
    pub tank: TankConfig,
    /// Duration of one step in hours.
    pub step_hours: f64,
    pub initial_temperature: InitialTemperature,
    /// Half-width of the uniform jitter added to each unit's start temperature (°C).
    pub initial_temperature_spread: f64,
    /// Half-width of the uniform per-household draw multiplier around 1.0.
    pub demand_variation: f64,
    pub seed: u64,
}

/// Builds `spec.size` controllers, each independently seeded from `spec.seed`.
///
/// Unit `i` keeps population index `i` for the whole run.
///
/// # Errors
///
/// Returns `Error::Configuration` for an empty population, a non-positive
/// step duration, or negative spreads.
pub fn build_population(spec: &PopulationSpec, ambient: f64) -> Result<Vec<Controller>> {
    if spec.size == 0 {
        return Err(Error::Configuration("population size must be > 0".into()));
    }
    if spec.step_hours <= 0.0 {
        return Err(Error::Configuration("step duration must be > 0".into()));
    }
    if spec.initial_temperature_spread < 0.0 || !(0.0..1.0).contains(&spec.demand_variation) {
        return Err(Error::Configuration(
            "initial temperature spread must be >= 0 and demand variation in [0, 1)".into(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let tsf = spec.tank.time_scaling_factor(spec.step_hours);
    let base = match spec.initial_temperature {
        InitialTemperature::Ambient => ambient,
        InitialTemperature::Fixed(t) => t,
    };

    let population = (0..spec.size)
        .map(|id| {
            let jitter = symmetric(&mut rng, spec.initial_temperature_spread);
            let demand_scale = 1.0 + symmetric(&mut rng, spec.demand_variation);
            let heater = WaterHeater::new(spec.tank.clone(), tsf, base + jitter);
            Controller::new(id, heater, demand_scale)
        })
        .collect();
    Ok(population)
}

/// Uniform sample in `[-half_width, half_width]`, or `0` when the width is zero.
fn symmetric(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.random_range(-half_width..=half_width)
    } else {
        0.0
    }
}
