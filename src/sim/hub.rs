//! Demand-response hub: scheduling state machine and run loop.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::devices::PowerMode;
use crate::error::{Error, Result};

use super::aggregate::aggregate;
use super::clock::StepRange;
use super::controller::Controller;
use super::division::Partition;
use super::environment::{EnvironmentSnapshot, EnvironmentSource};
use super::types::{AggregateRecord, DemandMode, HubSettings};
use super::zones::ReactivationZones;

/// Seed offset for the comms-sampling RNG so it never mirrors the population RNG.
const DIVISION_SEED_OFFSET: u64 = 101;

/// What the hub does on a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    /// No signal; every controller just steps.
    IdleStep,
    /// Re-divide the population and signal the new comms subset LOW.
    PeakBoundary,
    /// Signal one reactivation zone REGULAR.
    ReactivationZoneStep { zone: usize },
    /// Signal the whole comms subset REGULAR at once.
    NonPeakBoundary,
}

impl fmt::Display for HubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdleStep => write!(f, "IDLE_STEP"),
            Self::PeakBoundary => write!(f, "PEAK_BOUNDARY"),
            Self::ReactivationZoneStep { zone } => write!(f, "REACTIVATION_ZONE_STEP({zone})"),
            Self::NonPeakBoundary => write!(f, "NON_PEAK_BOUNDARY"),
        }
    }
}

/// Scheduling events reported by the environment for the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryFlags {
    pub peak: bool,
    pub non_peak: bool,
    pub in_reactivation: bool,
    pub zone_boundary: bool,
    pub zone_index: usize,
    pub reactivation_hours: usize,
}

impl BoundaryFlags {
    /// Reads the flags from an environment already synced to the step.
    pub fn observe(env: &impl EnvironmentSource) -> Self {
        Self {
            peak: env.is_at_peak_boundary(),
            non_peak: env.is_at_non_peak_boundary(),
            in_reactivation: env.is_in_reactivation_period(),
            zone_boundary: env.is_at_zone_boundary(),
            zone_index: env.reactivation_zone_index(),
            reactivation_hours: env.reactivation_hours(),
        }
    }
}

/// Ordered, total transition function of the hub.
///
/// Priority: off-interval or comms disabled, then peak boundary, then
/// reactivation zone boundary, then abrupt non-peak reactivation (only when
/// no reactivation hours are configured), otherwise idle.
pub fn next_state(
    step: usize,
    hub_interval: usize,
    comms_enabled: bool,
    flags: &BoundaryFlags,
) -> HubState {
    let on_interval = hub_interval > 0 && step % hub_interval == 0;
    if !on_interval || !comms_enabled {
        HubState::IdleStep
    } else if flags.peak {
        HubState::PeakBoundary
    } else if flags.in_reactivation && flags.zone_boundary {
        HubState::ReactivationZoneStep {
            zone: flags.zone_index,
        }
    } else if flags.non_peak && flags.reactivation_hours == 0 {
        HubState::NonPeakBoundary
    } else {
        HubState::IdleStep
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step in the range was simulated.
    Completed,
    /// A stop request arrived; `at_step` was not simulated.
    Interrupted { at_step: usize },
    /// The environment had no data for `at_step`.
    EnvironmentExhausted { at_step: usize },
}

impl RunOutcome {
    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted { .. } => "interrupted",
            Self::EnvironmentExhausted { .. } => "environment_exhausted",
        }
    }

    /// Process exit code. Running out of data ends an unbounded run normally.
    pub fn exit_code(&self, bounded: bool) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Interrupted { .. } => 130,
            Self::EnvironmentExhausted { .. } if bounded => 2,
            Self::EnvironmentExhausted { .. } => 0,
        }
    }
}

/// Result of [`Hub::run`]: the records produced so far and how the run ended.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// One record per simulated step, in step order.
    pub records: Vec<AggregateRecord>,
}

/// Drives the population through the step range.
///
/// Generic over `E: EnvironmentSource` for static dispatch, like the rest of
/// the engine. Steps are strictly sequential; within a step the controller
/// updates fan out across the rayon pool and rejoin before aggregation.
pub struct Hub<E: EnvironmentSource> {
    settings: HubSettings,
    environment: E,
    population: Vec<Controller>,
    partition: Partition,
    zones: Option<ReactivationZones>,
    rng: StdRng,
    stop: Arc<AtomicBool>,
}

impl<E: EnvironmentSource> Hub<E> {
    /// Creates a hub. The whole population starts in the non-comms subset.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `hub_interval` is zero or the
    /// population is empty.
    pub fn new(settings: HubSettings, environment: E, population: Vec<Controller>) -> Result<Self> {
        if settings.hub_interval == 0 {
            return Err(Error::Configuration("hub_interval must be > 0".into()));
        }
        if population.is_empty() {
            return Err(Error::Configuration("population must not be empty".into()));
        }

        let rng = StdRng::seed_from_u64(settings.seed.wrapping_add(DIVISION_SEED_OFFSET));
        let partition = Partition::all_non_comms(population.len());
        Ok(Self {
            settings,
            environment,
            population,
            partition,
            zones: None,
            rng,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shares a stop flag that is checked between steps.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that requests a stop before the next step when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Executes one step and returns its aggregate record.
    ///
    /// # Errors
    ///
    /// Returns `Error::EnvironmentRange` if the environment has no data for
    /// `step`; no controller is touched in that case.
    pub fn step(&mut self, step: usize) -> Result<AggregateRecord> {
        self.environment.sync_to(step)?;
        let env = *self.environment.snapshot();
        debug!(
            step,
            hour = env.hour_of_run,
            day = env.day,
            time = %env.time_of_day,
            "time step"
        );

        let flags = BoundaryFlags::observe(&self.environment);
        let state = next_state(
            step,
            self.settings.hub_interval,
            self.settings.comms_enabled,
            &flags,
        );
        self.dispatch(state, step);

        let effective = match self.settings.demand_mode {
            DemandMode::Profile => env,
            DemandMode::Disabled => EnvironmentSnapshot {
                demand_volume: 0.0,
                ..env
            },
        };
        self.population
            .par_iter_mut()
            .for_each(|controller| controller.step(&effective));

        let snapshots: Vec<_> = self.population.iter().map(Controller::snapshot).collect();
        Ok(aggregate(&effective, &snapshots, &self.partition))
    }

    /// Applies the signals for `state`. Runs strictly between steps.
    fn dispatch(&mut self, state: HubState, step: usize) {
        match state {
            HubState::IdleStep => {}
            HubState::PeakBoundary => {
                self.partition = self.settings.division.divide(
                    self.population.len(),
                    self.settings.division_size,
                    &mut self.rng,
                );
                self.zones = None;
                let members = self.partition.comms().to_vec();
                self.signal(PowerMode::Low, &members);
                info!(
                    step,
                    comms = self.partition.comms().len(),
                    non_comms = self.partition.non_comms().len(),
                    "peak boundary: comms subset signalled LOW"
                );
            }
            HubState::ReactivationZoneStep { zone } => {
                if zone == 0 {
                    let zone_count = self.environment.reactivation_zone_count().max(1);
                    let population = &self.population;
                    self.zones = Some(ReactivationZones::build(
                        self.partition.comms(),
                        zone_count,
                        |i| population[i].temperature(),
                    ));
                }
                let Some(zones) = &self.zones else {
                    debug!(step, zone, "no zone map for this reactivation period");
                    return;
                };
                let members = zones.zone(zone).to_vec();
                self.signal(PowerMode::Regular, &members);
                info!(step, zone, units = members.len(), "reactivation zone signalled REGULAR");
            }
            HubState::NonPeakBoundary => {
                let members = self.partition.comms().to_vec();
                self.signal(PowerMode::Regular, &members);
                info!(
                    step,
                    units = members.len(),
                    "non-peak boundary: comms subset signalled REGULAR"
                );
            }
        }
    }

    fn signal(&mut self, mode: PowerMode, members: &[usize]) {
        for &i in members {
            self.population[i].signal(mode);
        }
    }

    /// Runs every step in the configured range.
    ///
    /// Stops early, between steps, when the stop flag is set or the
    /// environment runs out of data. The returned records are always a
    /// valid prefix of a completed run.
    pub fn run(&mut self) -> RunReport {
        let mut range = StepRange::new(self.settings.start_step, self.settings.end_step);
        let mut records = Vec::with_capacity(range.remaining().unwrap_or(0));
        info!(
            start = self.settings.start_step,
            end = ?self.settings.end_step,
            population = self.population.len(),
            "run started"
        );

        let outcome = loop {
            let Some(step) = range.tick() else {
                break RunOutcome::Completed;
            };
            if self.stop.load(Ordering::SeqCst) {
                info!(step, "stop requested");
                break RunOutcome::Interrupted { at_step: step };
            }
            match self.step(step) {
                Ok(record) => {
                    debug!("{record}");
                    records.push(record);
                }
                Err(e) => {
                    warn!(step, error = %e, "stopping run");
                    break RunOutcome::EnvironmentExhausted { at_step: step };
                }
            }
        };

        info!(outcome = outcome.label(), steps = records.len(), "run finished");
        RunReport { outcome, records }
    }

    pub fn population(&self) -> &[Controller] {
        &self.population
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Zone map of the current reactivation period, if one has been built.
    pub fn zones(&self) -> Option<&ReactivationZones> {
        self.zones.as_ref()
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> BoundaryFlags {
        BoundaryFlags::default()
    }

    #[test]
    fn off_interval_is_idle_even_at_peak() {
        let f = BoundaryFlags {
            peak: true,
            ..flags()
        };
        assert_eq!(next_state(3, 2, true, &f), HubState::IdleStep);
        assert_eq!(next_state(4, 2, true, &f), HubState::PeakBoundary);
    }

    #[test]
    fn comms_disabled_is_always_idle() {
        let f = BoundaryFlags {
            peak: true,
            non_peak: true,
            ..flags()
        };
        assert_eq!(next_state(0, 1, false, &f), HubState::IdleStep);
    }

    #[test]
    fn peak_wins_over_reactivation() {
        let f = BoundaryFlags {
            peak: true,
            in_reactivation: true,
            zone_boundary: true,
            zone_index: 2,
            reactivation_hours: 4,
            ..flags()
        };
        assert_eq!(next_state(0, 1, true, &f), HubState::PeakBoundary);
    }

    #[test]
    fn zone_boundary_inside_period() {
        let f = BoundaryFlags {
            in_reactivation: true,
            zone_boundary: true,
            zone_index: 1,
            reactivation_hours: 4,
            ..flags()
        };
        assert_eq!(
            next_state(0, 1, true, &f),
            HubState::ReactivationZoneStep { zone: 1 }
        );
    }

    #[test]
    fn non_peak_is_abrupt_only_without_reactivation_hours() {
        let abrupt = BoundaryFlags {
            non_peak: true,
            ..flags()
        };
        assert_eq!(next_state(0, 1, true, &abrupt), HubState::NonPeakBoundary);

        let staged = BoundaryFlags {
            non_peak: true,
            reactivation_hours: 4,
            ..flags()
        };
        assert_eq!(next_state(0, 1, true, &staged), HubState::IdleStep);
    }

    #[test]
    fn zone_boundary_outside_period_is_idle() {
        let f = BoundaryFlags {
            zone_boundary: true,
            ..flags()
        };
        assert_eq!(next_state(0, 1, true, &f), HubState::IdleStep);
    }

    #[test]
    fn exit_codes_distinguish_outcomes() {
        assert_eq!(RunOutcome::Completed.exit_code(true), 0);
        assert_eq!(RunOutcome::Interrupted { at_step: 3 }.exit_code(true), 130);
        assert_eq!(RunOutcome::EnvironmentExhausted { at_step: 3 }.exit_code(true), 2);
        assert_eq!(RunOutcome::EnvironmentExhausted { at_step: 3 }.exit_code(false), 0);
    }
}
