//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::devices::{TankConfig, TankSize};
use crate::error::Result;
use crate::io::profile_csv::load_profile;
use crate::sim::division::DivisionStrategy;
use crate::sim::environment::EnvironmentSource;
use crate::sim::event::PeakWindow;
use crate::sim::hub::Hub;
use crate::sim::population::{InitialTemperature, PopulationSpec, build_population};
use crate::sim::profile::{ProfileEnvironment, ProfileHour};
use crate::sim::types::{DemandMode, HubSettings};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Step range, timing and hub parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Population size, tank variant and starting temperatures.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Comms-subset selection.
    #[serde(default)]
    pub division: DivisionConfig,
    /// Post-peak staged reactivation.
    #[serde(default)]
    pub reactivation: ReactivationConfig,
    /// Daily peak windows.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Environment profile source.
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Step range, timing and hub parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed.
    pub seed: u64,
    /// First simulated step.
    pub start_step: usize,
    /// Exclusive last step. Omit together with `--unbounded` to run until stopped.
    pub end_step: Option<usize>,
    /// Steps per simulated hour (must be > 0).
    pub steps_per_hour: usize,
    /// Steps between hub scheduling decisions (must be > 0).
    pub hub_interval: usize,
    /// Disables all hub signalling.
    pub no_comms: bool,
    /// Draw mode: `"none"` or `"profile"`.
    pub demand: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_step: 0,
            end_step: Some(2 * 24 * 60),
            steps_per_hour: 60,
            hub_interval: 1,
            no_comms: false,
            demand: "profile".to_string(),
        }
    }
}

/// Population size, tank variant and starting temperatures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Number of units (must be > 0).
    pub size: usize,
    /// Tank variant: `"small"` or `"large"`.
    pub tank_size: String,
    /// Mean starting temperature (°C). `None` starts every unit at ambient.
    pub initial_temperature: Option<f64>,
    /// Half-width of the uniform jitter around the starting temperature (°C).
    pub initial_temperature_spread: f64,
    /// Half-width of the per-household draw multiplier around 1.0.
    pub demand_variation: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            tank_size: "small".to_string(),
            initial_temperature: Some(55.0),
            initial_temperature_spread: 5.0,
            demand_variation: 0.5,
        }
    }
}

/// Comms-subset selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DivisionConfig {
    /// `"constant"`, `"variable"`, `"none"` or `"entire"`.
    pub strategy: String,
    /// Subset size (constant) or cap (variable).
    pub size: usize,
}

impl Default for DivisionConfig {
    fn default() -> Self {
        Self {
            strategy: "constant".to_string(),
            size: 25,
        }
    }
}

/// Post-peak staged reactivation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactivationConfig {
    /// Length of the reactivation period. `0` reactivates everyone at once.
    pub hours: usize,
    /// Number of zones the period is split into (must be > 0).
    pub zones: usize,
}

impl Default for ReactivationConfig {
    fn default() -> Self {
        Self { hours: 4, zones: 4 }
    }
}

/// One daily peak window, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeakWindowConfig {
    pub start_hour: usize,
    pub end_hour: usize,
}

/// Daily peak windows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub peaks: Vec<PeakWindowConfig>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            peaks: vec![
                PeakWindowConfig {
                    start_hour: 7,
                    end_hour: 10,
                },
                PeakWindowConfig {
                    start_hour: 17,
                    end_hour: 21,
                },
            ],
        }
    }
}

/// Environment profile source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// CSV profile (`hour,ambient,inlet,demand`). `None` uses the synthetic profile.
    pub path: Option<PathBuf>,
    /// Length of the synthetic profile in days.
    pub days: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self { path: None, days: 3 }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps_per_hour"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: constant-size comms subset with staged
    /// reactivation over four hours.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            population: PopulationConfig::default(),
            division: DivisionConfig::default(),
            reactivation: ReactivationConfig::default(),
            schedule: ScheduleConfig::default(),
            profile: ProfileConfig::default(),
        }
    }

    /// Returns the abrupt preset: the whole comms subset returns to REGULAR
    /// at the first non-peak step.
    pub fn abrupt() -> Self {
        Self {
            reactivation: ReactivationConfig {
                hours: 0,
                ..ReactivationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the no-comms preset: hub signalling disabled, every unit
    /// follows its own thermostat.
    pub fn no_comms() -> Self {
        Self {
            simulation: SimulationConfig {
                no_comms: true,
                ..SimulationConfig::default()
            },
            division: DivisionConfig {
                strategy: "none".to_string(),
                size: 0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the large-tank preset: 80 gal units, half the fleet comms-capable.
    pub fn large_tanks() -> Self {
        Self {
            population: PopulationConfig {
                tank_size: "large".to_string(),
                ..PopulationConfig::default()
            },
            division: DivisionConfig {
                strategy: "constant".to_string(),
                size: 50,
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "abrupt", "no_comms", "large_tanks"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> std::result::Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "abrupt" => Ok(Self::abrupt()),
            "no_comms" => Ok(Self::no_comms()),
            "large_tanks" => Ok(Self::large_tanks()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e: toml::de::Error| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigError {
                field: field.into(),
                message,
            });
        };

        let s = &self.simulation;
        if s.steps_per_hour == 0 {
            push("simulation.steps_per_hour", "must be > 0".into());
        }
        if s.hub_interval == 0 {
            push("simulation.hub_interval", "must be > 0".into());
        }
        if let Some(end) = s.end_step
            && end <= s.start_step
        {
            push(
                "simulation.end_step",
                format!("must be > simulation.start_step ({})", s.start_step),
            );
        }
        if let Err(e) = s.demand.parse::<DemandMode>() {
            push("simulation.demand", e.to_string());
        }

        let p = &self.population;
        if p.size == 0 {
            push("population.size", "must be > 0".into());
        }
        if let Err(e) = p.tank_size.parse::<TankSize>() {
            push("population.tank_size", e.to_string());
        }
        if p.initial_temperature_spread.is_nan() || p.initial_temperature_spread < 0.0 {
            push("population.initial_temperature_spread", "must be >= 0".into());
        }
        if !(0.0..1.0).contains(&p.demand_variation) {
            push("population.demand_variation", "must be in [0.0, 1.0)".into());
        }

        match self.division.strategy.parse::<DivisionStrategy>() {
            Ok(DivisionStrategy::ConstantSize) if self.division.size > p.size => push(
                "division.size",
                format!("must be <= population.size ({})", p.size),
            ),
            Ok(_) => {}
            Err(e) => push("division.strategy", e.to_string()),
        }

        let r = &self.reactivation;
        if r.hours >= 24 {
            push("reactivation.hours", "must be < 24".into());
        }
        if r.zones == 0 {
            push("reactivation.zones", "must be > 0".into());
        } else if r.hours > 0 && r.hours * s.steps_per_hour < r.zones {
            push(
                "reactivation.zones",
                format!(
                    "must be <= reactivation.hours * simulation.steps_per_hour ({})",
                    r.hours * s.steps_per_hour
                ),
            );
        }

        for (i, w) in self.schedule.peaks.iter().enumerate() {
            if w.start_hour >= w.end_hour || w.end_hour > 24 {
                push(
                    &format!("schedule.peaks[{i}]"),
                    format!(
                        "must satisfy start_hour < end_hour <= 24, got {}..{}",
                        w.start_hour, w.end_hour
                    ),
                );
            }
        }

        if self.profile.path.is_none() && self.profile.days == 0 {
            push("profile.days", "must be > 0 without a profile path".into());
        }

        errors
    }

    /// Peak windows as simulation types.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for a malformed window.
    pub fn peak_windows(&self) -> Result<Vec<PeakWindow>> {
        self.schedule
            .peaks
            .iter()
            .map(|w| PeakWindow::new(w.start_hour, w.end_hour))
            .collect()
    }

    /// Hub settings derived from the `[simulation]` and `[division]` sections.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for an unknown strategy or demand mode.
    pub fn hub_settings(&self) -> Result<HubSettings> {
        let s = &self.simulation;
        Ok(HubSettings {
            hub_interval: s.hub_interval,
            comms_enabled: !s.no_comms,
            division: self.division.strategy.parse()?,
            division_size: self.division.size,
            demand_mode: s.demand.parse()?,
            ..HubSettings::new(s.start_step, s.end_step, s.seed)
        })
    }

    /// Population parameters derived from `[population]`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for an unknown tank size.
    pub fn population_spec(&self) -> Result<PopulationSpec> {
        let p = &self.population;
        let tank = TankConfig::for_size(p.tank_size.parse()?);
        Ok(PopulationSpec {
            size: p.size,
            tank,
            step_hours: 1.0 / self.simulation.steps_per_hour.max(1) as f64,
            initial_temperature: p
                .initial_temperature
                .map_or(InitialTemperature::Ambient, InitialTemperature::Fixed),
            initial_temperature_spread: p.initial_temperature_spread,
            demand_variation: p.demand_variation,
            seed: self.simulation.seed,
        })
    }

    /// Loads the configured CSV profile or synthesises one.
    ///
    /// # Errors
    ///
    /// Propagates profile read and parse failures.
    pub fn profile_hours(&self) -> Result<Vec<ProfileHour>> {
        match &self.profile.path {
            Some(path) => load_profile(path),
            None => Ok(ProfileEnvironment::synthetic_hours(self.profile.days)),
        }
    }

    /// Builds a ready-to-run hub from the configured profile.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for inconsistent parameters and
    /// propagates profile loading failures.
    pub fn build_hub(&self) -> Result<Hub<ProfileEnvironment>> {
        self.build_hub_with_hours(self.profile_hours()?)
    }

    /// Builds a hub over an explicit hourly profile.
    ///
    /// The population starts from the ambient temperature at `start_step`
    /// when no fixed initial temperature is configured.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for inconsistent parameters, or
    /// `Error::EnvironmentRange` if the profile does not cover `start_step`.
    pub fn build_hub_with_hours(&self, hours: Vec<ProfileHour>) -> Result<Hub<ProfileEnvironment>> {
        let mut environment = ProfileEnvironment::new(
            hours,
            self.simulation.steps_per_hour,
            self.peak_windows()?,
            self.reactivation.hours,
            self.reactivation.zones,
        )?;

        let spec = self.population_spec()?;
        let ambient = match spec.initial_temperature {
            InitialTemperature::Ambient => {
                environment.sync_to(self.simulation.start_step)?;
                environment.ambient_temperature()
            }
            InitialTemperature::Fixed(t) => t,
        };
        let population = build_population(&spec, ambient)?;

        Hub::new(self.hub_settings()?, environment, population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_baseline() {
        let cfg = ScenarioConfig::from_preset("baseline");
        assert!(cfg.is_ok());
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
seed = 99
start_step = 0
end_step = 48
steps_per_hour = 2
hub_interval = 1
no_comms = false
demand = "none"

[population]
size = 10
tank_size = "large"
initial_temperature = 58.0
initial_temperature_spread = 0.0
demand_variation = 0.0

[division]
strategy = "variable"
size = 6

[reactivation]
hours = 2
zones = 4

[schedule]
peaks = [{ start_hour = 5, end_hour = 8 }]

[profile]
days = 1
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps_per_hour), Some(2));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.end_step), Some(Some(48)));
        assert_eq!(cfg.as_ref().map(|c| &*c.population.tank_size), Some("large"));
        assert_eq!(cfg.as_ref().map(|c| c.schedule.peaks.len()), Some(1));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
steps_per_hour = 60
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_zero_steps_per_hour() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_hour = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.steps_per_hour"));
    }

    #[test]
    fn validation_catches_zero_hub_interval() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.hub_interval = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.hub_interval"));
    }

    #[test]
    fn validation_catches_empty_step_range() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.start_step = 10;
        cfg.simulation.end_step = Some(10);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.end_step"));
    }

    #[test]
    fn validation_catches_oversized_division() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.division.size = cfg.population.size + 1;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "division.size"));
    }

    #[test]
    fn validation_catches_bad_names() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.division.strategy = "half".to_string();
        cfg.population.tank_size = "medium".to_string();
        cfg.simulation.demand = "always".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "division.strategy"));
        assert!(errors.iter().any(|e| e.field == "population.tank_size"));
        assert!(errors.iter().any(|e| e.field == "simulation.demand"));
    }

    #[test]
    fn validation_catches_bad_peak_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.schedule.peaks.push(PeakWindowConfig {
            start_hour: 20,
            end_hour: 25,
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "schedule.peaks[2]"));
    }

    #[test]
    fn validation_catches_zero_zones() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.reactivation.zones = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "reactivation.zones"));
    }

    #[test]
    fn validation_catches_day_long_reactivation() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.reactivation.hours = 24;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "reactivation.hours"));

        cfg.reactivation.hours = 23;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn unvalidated_bad_peak_window_fails_hub_build() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.population.size = 4;
        cfg.division.size = 2;
        cfg.schedule.peaks.push(PeakWindowConfig {
            start_hour: 9,
            end_hour: 3,
        });
        assert!(matches!(cfg.peak_windows(), Err(Error::Configuration(_))));
        assert!(matches!(cfg.build_hub(), Err(Error::Configuration(_))));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn abrupt_has_no_reactivation_period() {
        let cfg = ScenarioConfig::abrupt();
        assert_eq!(cfg.reactivation.hours, 0);
        assert_eq!(cfg.division.strategy, "constant");
    }

    #[test]
    fn no_comms_disables_signalling() {
        let settings = ScenarioConfig::no_comms().hub_settings().expect("valid preset");
        assert!(!settings.comms_enabled);
        assert_eq!(settings.division, DivisionStrategy::NoComms);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        // steps_per_hour kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps_per_hour), Some(60));
        // population kept default
        assert_eq!(cfg.as_ref().map(|c| c.population.size), Some(100));
    }

    #[test]
    fn build_hub_from_baseline() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.population.size = 8;
        cfg.division.size = 4;
        let hub = cfg.build_hub().expect("baseline hub");
        assert_eq!(hub.population().len(), 8);
        assert_eq!(hub.settings().division, DivisionStrategy::ConstantSize);
        assert_eq!(hub.settings().demand_mode, DemandMode::Profile);
    }

    #[test]
    fn ambient_start_reads_profile() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.population.size = 3;
        cfg.division.size = 1;
        cfg.population.initial_temperature = None;
        cfg.population.initial_temperature_spread = 0.0;
        let hours = vec![
            ProfileHour {
                ambient: 21.5,
                inlet: 10.0,
                demand: 0.0,
            };
            24
        ];
        let hub = cfg.build_hub_with_hours(hours).expect("hub over flat profile");
        for c in hub.population() {
            assert_eq!(c.temperature(), 21.5);
        }
    }
}
