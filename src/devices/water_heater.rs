use crate::devices::types::{
    PowerState, TankConfig, WATER_LB_PER_GALLON, WATER_SPECIFIC_HEAT, celsius_to_fahrenheit,
    fahrenheit_to_celsius,
};
use crate::sim::environment::EnvironmentSnapshot;

/// A single electric storage water heater modelled as one lumped thermal mass.
///
/// `WaterHeater` owns the physical state of one tank: water temperature,
/// element state, and the accumulated on-time and energy counters. The
/// counters only move through [`WaterHeater::advance`] and
/// [`WaterHeater::set_power`].
///
/// # Heat balance
///
/// Each step blends the previous temperature exponentially toward a
/// step-dependent equilibrium:
///
/// ```text
/// g  = surface_area / insulation_resistance
/// b  = demand_volume * specific_heat * lb_per_gallon
/// r' = 1 / (g + b)
/// k  = exp(-time_scaling_factor / r')
/// T* = r' * (g * ambient + b * inlet + power_if_on)
/// T  = T_prev * k + T* * (1 - k)
/// ```
///
/// The computation runs in °F and the result is converted back to °C.
#[derive(Debug, Clone)]
pub struct WaterHeater {
    config: TankConfig,
    time_scaling_factor: f64,
    temperature: f64,
    state: PowerState,
    total_time_on: u64,
    total_energy_used: f64,
}

impl WaterHeater {
    /// Creates an OFF heater at `initial_temperature` (°C).
    ///
    /// # Arguments
    ///
    /// * `config` - Tank parameters
    /// * `time_scaling_factor` - Step duration over thermal capacitance
    ///   (see [`TankConfig::time_scaling_factor`])
    /// * `initial_temperature` - Starting water temperature in °C
    pub fn new(config: TankConfig, time_scaling_factor: f64, initial_temperature: f64) -> Self {
        Self {
            config,
            time_scaling_factor,
            temperature: initial_temperature,
            state: PowerState::Off,
            total_time_on: 0,
            total_energy_used: 0.0,
        }
    }

    /// Advances the water temperature by one step and returns it (°C).
    ///
    /// A unit that is ON at the start of the step accrues one step of on-time.
    pub fn advance(&mut self, env: &EnvironmentSnapshot) -> f64 {
        let is_on = self.state == PowerState::On;
        if is_on {
            self.total_time_on += 1;
        }

        self.temperature = next_temperature(
            &self.config,
            self.time_scaling_factor,
            self.temperature,
            env,
            is_on,
        );
        self.temperature
    }

    /// True iff the element is OFF and the water is colder than `threshold`.
    pub fn needs_to_turn_on(&self, threshold: f64) -> bool {
        self.state == PowerState::Off && self.temperature < threshold
    }

    /// True iff the element is ON and the water has reached `desired_temperature`.
    pub fn needs_to_turn_off(&self, desired_temperature: f64) -> bool {
        self.state == PowerState::On && self.temperature >= desired_temperature
    }

    /// Sets the element state. An actual toggle costs `state_change_energy_cost`.
    pub fn set_power(&mut self, state: PowerState) {
        if self.state != state {
            self.state = state;
            self.total_energy_used += self.config.state_change_energy_cost;
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == PowerState::On
    }

    /// Number of steps spent ON so far.
    pub fn total_time_on(&self) -> u64 {
        self.total_time_on
    }

    /// Energy accumulated from state changes so far (kWh).
    pub fn total_energy_used(&self) -> f64 {
        self.total_energy_used
    }

    pub fn config(&self) -> &TankConfig {
        &self.config
    }
}

/// Equilibrium temperature `T*` (°C) the tank would settle at under
/// constant conditions.
pub fn equilibrium_temperature(
    config: &TankConfig,
    ambient: f64,
    inlet: f64,
    demand_volume: f64,
    is_on: bool,
) -> f64 {
    let (_, target_f) = balance(config, ambient, inlet, demand_volume, is_on);
    fahrenheit_to_celsius(target_f)
}

/// Next temperature (°C) after one step from `previous` (°C).
pub fn next_temperature(
    config: &TankConfig,
    time_scaling_factor: f64,
    previous: f64,
    env: &EnvironmentSnapshot,
    is_on: bool,
) -> f64 {
    let (r_prime, target_f) = balance(
        config,
        env.ambient_temperature,
        env.inlet_temperature,
        env.demand_volume,
        is_on,
    );
    let k = (-time_scaling_factor / r_prime).exp();
    let previous_f = celsius_to_fahrenheit(previous);
    fahrenheit_to_celsius(previous_f * k + target_f * (1.0 - k))
}

/// Returns `(r', T*)` with `T*` in °F.
fn balance(
    config: &TankConfig,
    ambient: f64,
    inlet: f64,
    demand_volume: f64,
    is_on: bool,
) -> (f64, f64) {
    let g = config.tank_surface_area / config.insulation_thermal_resistance;
    let b = demand_volume.max(0.0) * WATER_SPECIFIC_HEAT * WATER_LB_PER_GALLON;
    let r_prime = 1.0 / (g + b);
    let power = if is_on { config.power_input } else { 0.0 };
    let target = r_prime
        * (g * celsius_to_fahrenheit(ambient) + b * celsius_to_fahrenheit(inlet) + power);
    (r_prime, target)
}
