use crate::devices::{PowerMode, PowerState, WaterHeater};
use crate::sim::environment::EnvironmentSnapshot;
use crate::sim::types::ControllerSnapshot;

/// Demand-response controller wrapping one water heater.
///
/// Owns the active lower threshold, which always matches the current
/// [`PowerMode`]. The hub changes the mode through [`Controller::signal`];
/// the only self-initiated change is the LOW → REGULAR auto-recovery in
/// [`Controller::step`].
#[derive(Debug, Clone)]
pub struct Controller {
    id: usize,
    heater: WaterHeater,
    mode: PowerMode,
    active_lower_threshold: f64,
    /// Multiplier applied to the shared draw rate for this household.
    demand_scale: f64,
    last_demand: f64,
}

impl Controller {
    /// Creates a REGULAR-mode controller around `heater`.
    pub fn new(id: usize, heater: WaterHeater, demand_scale: f64) -> Self {
        let active_lower_threshold = heater.config().regular_power_threshold;
        Self {
            id,
            heater,
            mode: PowerMode::Regular,
            active_lower_threshold,
            demand_scale,
            last_demand: 0.0,
        }
    }

    /// Switches power mode and the associated lower threshold. Idempotent.
    pub fn signal(&mut self, mode: PowerMode) {
        self.mode = mode;
        self.active_lower_threshold = self.heater.config().threshold_for(mode);
    }

    /// Advances the heater one step, then applies the hysteresis policy.
    ///
    /// At most one transition fires: turn off at the desired temperature,
    /// otherwise turn on below the active threshold. A LOW-mode unit that
    /// drops below the LOW threshold turns on and reverts to REGULAR.
    pub fn step(&mut self, env: &EnvironmentSnapshot) {
        let local = EnvironmentSnapshot {
            demand_volume: env.demand_volume * self.demand_scale,
            ..*env
        };
        self.last_demand = local.demand_volume;

        let temperature = self.heater.advance(&local);
        let desired = self.heater.config().desired_temperature;

        if self.heater.needs_to_turn_off(desired) {
            self.heater.set_power(PowerState::Off);
        } else if self.mode == PowerMode::Low
            && temperature < self.heater.config().low_power_threshold
        {
            self.heater.set_power(PowerState::On);
            self.signal(PowerMode::Regular);
        } else if self.heater.needs_to_turn_on(self.active_lower_threshold) {
            self.heater.set_power(PowerState::On);
        }
    }

    /// Read-only view for aggregation.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            id: self.id,
            temperature: self.heater.temperature(),
            on_state: self.heater.state(),
            power_mode: self.mode,
            total_time_on: self.heater.total_time_on(),
            total_energy_used: self.heater.total_energy_used(),
            demand: self.last_demand,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    pub fn active_lower_threshold(&self) -> f64 {
        self.active_lower_threshold
    }

    pub fn temperature(&self) -> f64 {
        self.heater.temperature()
    }

    pub fn heater(&self) -> &WaterHeater {
        &self.heater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::TankConfig;

    fn controller(initial: f64) -> Controller {
        let cfg = TankConfig::small();
        let tsf = cfg.time_scaling_factor(1.0 / 60.0);
        Controller::new(0, WaterHeater::new(cfg, tsf, initial), 1.0)
    }

    fn env(demand: f64) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            ambient_temperature: 20.0,
            inlet_temperature: 10.0,
            demand_volume: demand,
            ..EnvironmentSnapshot::default()
        }
    }

    #[test]
    fn signal_keeps_threshold_consistent_with_mode() {
        let mut c = controller(55.0);
        assert_eq!(c.active_lower_threshold(), 52.0);
        c.signal(PowerMode::Low);
        c.signal(PowerMode::Low);
        assert_eq!(c.mode(), PowerMode::Low);
        assert_eq!(c.active_lower_threshold(), 45.0);
        c.signal(PowerMode::Regular);
        assert_eq!(c.active_lower_threshold(), 52.0);
    }

    #[test]
    fn regular_unit_turns_on_below_regular_threshold() {
        let mut c = controller(51.0);
        c.step(&env(0.0));
        assert_eq!(c.snapshot().on_state, PowerState::On);
    }

    #[test]
    fn low_unit_waits_until_low_threshold() {
        let mut c = controller(51.0);
        c.signal(PowerMode::Low);
        c.step(&env(0.0));
        assert_eq!(c.snapshot().on_state, PowerState::Off);
        assert_eq!(c.mode(), PowerMode::Low);
    }

    #[test]
    fn low_unit_below_low_threshold_self_promotes() {
        let mut c = controller(44.0);
        c.signal(PowerMode::Low);
        c.step(&env(0.0));
        let snap = c.snapshot();
        assert_eq!(snap.on_state, PowerState::On);
        assert_eq!(snap.power_mode, PowerMode::Regular);
        assert_eq!(c.active_lower_threshold(), 52.0);
    }

    #[test]
    fn hysteresis_does_not_chatter() {
        let mut c = controller(51.0);
        let snapshot = env(0.0);
        c.step(&snapshot);
        assert_eq!(c.snapshot().on_state, PowerState::On);

        let mut previous = PowerState::On;
        let mut turned_off_at = None;
        for i in 0..2_000 {
            c.step(&snapshot);
            let snap = c.snapshot();
            if previous == PowerState::On && snap.on_state == PowerState::Off {
                turned_off_at = Some(i);
                assert!(snap.temperature >= 60.0, "turned off early at {}", snap.temperature);
                break;
            }
            previous = snap.on_state;
        }
        assert!(turned_off_at.is_some(), "heater never reached the desired temperature");
    }

    #[test]
    fn demand_scale_applies_to_shared_draw() {
        let cfg = TankConfig::small();
        let mut c = Controller::new(3, WaterHeater::new(cfg, 0.0, 55.0), 1.5);
        c.step(&env(4.0));
        assert_eq!(c.snapshot().demand, 6.0);
        assert_eq!(c.id(), 3);
    }
}
