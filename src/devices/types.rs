//! Tank-size presets, power states, and unit conversions shared by the
//! water-heater model and its controller.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Watts to BTU per hour.
pub const BTU_PER_HOUR_PER_WATT: f64 = 3.412_141_63;

/// Specific heat of water (BTU / lb·°F).
pub const WATER_SPECIFIC_HEAT: f64 = 1.0;

/// Mass of one US gallon of water (lb / gal). Converts a gal/h draw into lb/h.
pub const WATER_LB_PER_GALLON: f64 = 8.34;

/// Converts a Celsius temperature to Fahrenheit.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Converts a Fahrenheit temperature to Celsius.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Heating element state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "OFF"),
            Self::On => write!(f, "ON"),
        }
    }
}

/// Power mode requested by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Regular,
    Low,
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "REGULAR"),
            Self::Low => write!(f, "LOW_POWER"),
        }
    }
}

/// Named tank-size preset. A run is homogeneous in tank size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankSize {
    Small,
    Large,
}

impl FromStr for TankSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(Self::Small),
            "large" => Ok(Self::Large),
            other => Err(Error::Configuration(format!(
                "unknown tank size \"{other}\", expected \"small\" or \"large\""
            ))),
        }
    }
}

/// Immutable physical and control parameters for one tank-size variant.
///
/// Temperatures are in °C. Thermal coefficients use BTU/h·°F so that the
/// heat balance runs in a single consistent scale (°F) internally.
#[derive(Debug, Clone, PartialEq)]
pub struct TankConfig {
    /// Outer surface area of the tank (ft²).
    pub tank_surface_area: f64,
    /// Insulation thermal resistance (h·ft²·°F / BTU).
    pub insulation_thermal_resistance: f64,
    /// Heating element power while ON (BTU/h).
    pub power_input: f64,
    /// Lumped thermal capacitance of the full tank (BTU / °F).
    pub thermal_capacitance: f64,
    /// Temperature at which the element turns off (°C).
    pub desired_temperature: f64,
    /// Lower bound that turns the element on in REGULAR mode (°C).
    pub regular_power_threshold: f64,
    /// Lower bound that turns the element on in LOW mode (°C).
    pub low_power_threshold: f64,
    /// Energy charged to the unit for every ON/OFF toggle (kWh).
    pub state_change_energy_cost: f64,
}

impl TankConfig {
    /// Creates a tank configuration, enforcing
    /// `low_power_threshold < regular_power_threshold < desired_temperature`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the thresholds are out of order or
    /// any physical constant is non-positive.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        tank_surface_area: f64,
        insulation_thermal_resistance: f64,
        power_input: f64,
        thermal_capacitance: f64,
        desired_temperature: f64,
        regular_power_threshold: f64,
        low_power_threshold: f64,
        state_change_energy_cost: f64,
    ) -> Result<Self> {
        if !(low_power_threshold < regular_power_threshold
            && regular_power_threshold < desired_temperature)
        {
            return Err(Error::Configuration(format!(
                "thresholds must satisfy low ({low_power_threshold}) < regular \
                 ({regular_power_threshold}) < desired ({desired_temperature})"
            )));
        }
        if tank_surface_area <= 0.0 || insulation_thermal_resistance <= 0.0 {
            return Err(Error::Configuration(
                "tank surface area and insulation resistance must be > 0".into(),
            ));
        }
        if thermal_capacitance <= 0.0 {
            return Err(Error::Configuration("thermal capacitance must be > 0".into()));
        }
        if power_input < 0.0 || state_change_energy_cost < 0.0 {
            return Err(Error::Configuration(
                "power input and state-change cost must be >= 0".into(),
            ));
        }

        Ok(Self {
            tank_surface_area,
            insulation_thermal_resistance,
            power_input,
            thermal_capacitance,
            desired_temperature,
            regular_power_threshold,
            low_power_threshold,
            state_change_energy_cost,
        })
    }

    /// 50 gal tank with a 4.5 kW element.
    pub fn small() -> Self {
        Self {
            tank_surface_area: 24.1,
            insulation_thermal_resistance: 12.0,
            power_input: 4500.0 * BTU_PER_HOUR_PER_WATT,
            thermal_capacitance: 50.0 * WATER_LB_PER_GALLON * WATER_SPECIFIC_HEAT,
            desired_temperature: 60.0,
            regular_power_threshold: 52.0,
            low_power_threshold: 45.0,
            state_change_energy_cost: 0.01,
        }
    }

    /// 80 gal tank with a 5.5 kW element.
    pub fn large() -> Self {
        Self {
            tank_surface_area: 30.8,
            insulation_thermal_resistance: 12.0,
            power_input: 5500.0 * BTU_PER_HOUR_PER_WATT,
            thermal_capacitance: 80.0 * WATER_LB_PER_GALLON * WATER_SPECIFIC_HEAT,
            desired_temperature: 60.0,
            regular_power_threshold: 50.0,
            low_power_threshold: 43.0,
            state_change_energy_cost: 0.01,
        }
    }

    /// Returns the preset for a tank size.
    pub fn for_size(size: TankSize) -> Self {
        match size {
            TankSize::Small => Self::small(),
            TankSize::Large => Self::large(),
        }
    }

    /// Lower threshold associated with a power mode (°C).
    pub fn threshold_for(&self, mode: PowerMode) -> f64 {
        match mode {
            PowerMode::Regular => self.regular_power_threshold,
            PowerMode::Low => self.low_power_threshold,
        }
    }

    /// Decay-exponent scale for one step of `step_hours` hours: `Δt / C`.
    pub fn time_scaling_factor(&self, step_hours: f64) -> f64 {
        step_hours / self.thermal_capacitance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_satisfy_threshold_ordering() {
        for cfg in [TankConfig::small(), TankConfig::large()] {
            assert!(cfg.low_power_threshold < cfg.regular_power_threshold);
            assert!(cfg.regular_power_threshold < cfg.desired_temperature);
        }
    }

    #[test]
    fn new_rejects_inverted_thresholds() {
        let err = TankConfig::new(24.1, 12.0, 15000.0, 417.0, 60.0, 40.0, 45.0, 0.01);
        assert!(matches!(err, Err(Error::Configuration(_))));
    }

    #[test]
    fn new_rejects_regular_above_desired() {
        let err = TankConfig::new(24.1, 12.0, 15000.0, 417.0, 60.0, 60.0, 45.0, 0.01);
        assert!(err.is_err());
    }

    #[test]
    fn new_accepts_preset_values() {
        let s = TankConfig::small();
        let cfg = TankConfig::new(
            s.tank_surface_area,
            s.insulation_thermal_resistance,
            s.power_input,
            s.thermal_capacitance,
            s.desired_temperature,
            s.regular_power_threshold,
            s.low_power_threshold,
            s.state_change_energy_cost,
        );
        assert_eq!(cfg.ok(), Some(s));
    }

    #[test]
    fn unknown_tank_size_is_configuration_error() {
        assert!(matches!("medium".parse::<TankSize>(), Err(Error::Configuration(_))));
        assert_eq!("large".parse::<TankSize>().ok(), Some(TankSize::Large));
    }

    #[test]
    fn temperature_conversion_round_trips() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(47.3)) - 47.3).abs() < 1e-12);
    }

    #[test]
    fn threshold_follows_mode() {
        let cfg = TankConfig::small();
        assert_eq!(cfg.threshold_for(PowerMode::Regular), 52.0);
        assert_eq!(cfg.threshold_for(PowerMode::Low), 45.0);
    }
}
