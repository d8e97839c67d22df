//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use ewh_sim::config::{PeakWindowConfig, ScenarioConfig};
use ewh_sim::sim::hub::Hub;
use ewh_sim::sim::profile::{ProfileEnvironment, ProfileHour};

/// Flat profile: constant ambient and inlet, no draw.
pub fn flat_hours(hours: usize, ambient: f64) -> Vec<ProfileHour> {
    vec![
        ProfileHour {
            ambient,
            inlet: 10.0,
            demand: 0.0,
        };
        hours
    ]
}

/// Flat profile with a constant hot-water draw of `demand` gal/h.
pub fn hours_with_draw(hours: usize, demand: f64) -> Vec<ProfileHour> {
    vec![
        ProfileHour {
            ambient: 20.0,
            inlet: 10.0,
            demand,
        };
        hours
    ]
}

/// Ten small tanks near 58 °C, one step per hour, a single peak from hour 5
/// to hour 8, and a constant comms subset of four. Draw is disabled so only
/// standby losses move temperatures.
pub fn peak_scenario(reactivation_hours: usize) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = 7;
    cfg.simulation.start_step = 0;
    cfg.simulation.end_step = Some(24);
    cfg.simulation.steps_per_hour = 1;
    cfg.simulation.hub_interval = 1;
    cfg.simulation.demand = "none".to_string();
    cfg.population.size = 10;
    cfg.population.tank_size = "small".to_string();
    cfg.population.initial_temperature = Some(58.0);
    cfg.population.initial_temperature_spread = 2.0;
    cfg.division.strategy = "constant".to_string();
    cfg.division.size = 4;
    cfg.reactivation.hours = reactivation_hours;
    cfg.reactivation.zones = 4;
    cfg.schedule.peaks = vec![PeakWindowConfig {
        start_hour: 5,
        end_hour: 8,
    }];
    cfg
}

/// Twenty small tanks near 54 °C under a steady draw, all comms-capable,
/// with a peak from hour 0 to hour 3. The draw cools every tank below the
/// REGULAR threshold, but not the LOW one, by the time the peak ends.
pub fn draw_scenario(reactivation_hours: usize) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = 5;
    cfg.simulation.start_step = 0;
    cfg.simulation.end_step = Some(10);
    cfg.simulation.steps_per_hour = 1;
    cfg.simulation.hub_interval = 1;
    cfg.simulation.demand = "profile".to_string();
    cfg.population.size = 20;
    cfg.population.tank_size = "small".to_string();
    cfg.population.initial_temperature = Some(54.0);
    cfg.population.initial_temperature_spread = 0.5;
    cfg.population.demand_variation = 0.0;
    cfg.division.strategy = "entire".to_string();
    cfg.reactivation.hours = reactivation_hours;
    cfg.reactivation.zones = 4;
    cfg.schedule.peaks = vec![PeakWindowConfig {
        start_hour: 0,
        end_hour: 3,
    }];
    cfg
}

/// Builds a hub for `cfg` over a flat 20 °C profile of `hours` hours.
pub fn hub_over_flat_profile(cfg: &ScenarioConfig, hours: usize) -> Hub<ProfileEnvironment> {
    let errors = cfg.validate();
    assert!(errors.is_empty(), "fixture config should be valid: {errors:?}");
    cfg.build_hub_with_hours(flat_hours(hours, 20.0))
        .expect("fixture hub should build")
}

/// Small-population variant of the baseline preset, for fast full runs.
pub fn small_baseline(seed: u64) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = seed;
    cfg.simulation.steps_per_hour = 4;
    cfg.simulation.end_step = Some(24 * 4);
    cfg.population.size = 20;
    cfg.division.size = 8;
    cfg
}
