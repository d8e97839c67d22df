//! Hourly-profile Environment Source.

use serde::Deserialize;

use super::environment::{EnvironmentSnapshot, EnvironmentSource, TimeOfDay};
use super::event::PeakWindow;
use crate::error::{Error, Result};

/// Environment readings for one hour of the run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProfileHour {
    /// Ambient air temperature (°C).
    pub ambient: f64,
    /// Inlet water temperature (°C).
    pub inlet: f64,
    /// Hot-water draw (gal/h).
    pub demand: f64,
}

/// Environment Source backed by an hourly profile and a daily peak schedule.
///
/// Step `s` maps to hour `s / steps_per_hour`; every step within an hour
/// shares that hour's readings.
///
/// # Scheduling events
///
/// - Peak boundary: first step of a window's start hour.
/// - Non-peak boundary: first step of a window's closing hour.
/// - Reactivation period: the `reactivation_hours` hours starting at a
///   non-peak boundary, split into `zones` equal spans of steps. Any
///   remainder is absorbed by the last zone.
#[derive(Debug, Clone)]
pub struct ProfileEnvironment {
    hours: Vec<ProfileHour>,
    steps_per_hour: usize,
    windows: Vec<PeakWindow>,
    reactivation_hours: usize,
    zones: usize,
    current: EnvironmentSnapshot,
}

impl ProfileEnvironment {
    /// Creates a profile environment positioned before step 0.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `steps_per_hour` or `zones` is zero,
    /// the reactivation period reaches a full day, or it has fewer steps
    /// than zones.
    pub fn new(
        hours: Vec<ProfileHour>,
        steps_per_hour: usize,
        windows: Vec<PeakWindow>,
        reactivation_hours: usize,
        zones: usize,
    ) -> Result<Self> {
        if steps_per_hour == 0 {
            return Err(Error::Configuration("steps_per_hour must be > 0".into()));
        }
        if zones == 0 {
            return Err(Error::Configuration("reactivation zones must be > 0".into()));
        }
        if reactivation_hours >= 24 {
            return Err(Error::Configuration(format!(
                "reactivation period of {reactivation_hours} h must be shorter than a day"
            )));
        }
        if reactivation_hours > 0 && reactivation_hours * steps_per_hour < zones {
            return Err(Error::Configuration(format!(
                "a {reactivation_hours} h reactivation period at {steps_per_hour} steps/h \
                 cannot hold {zones} zones"
            )));
        }

        Ok(Self {
            hours,
            steps_per_hour,
            windows,
            reactivation_hours,
            zones,
            current: EnvironmentSnapshot::default(),
        })
    }

    /// Builds a deterministic synthetic profile of `days` days.
    ///
    /// Ambient air follows a daily sinusoid peaking mid-afternoon, inlet water
    /// is constant, and hot-water draw has morning and evening peaks.
    pub fn synthetic_hours(days: usize) -> Vec<ProfileHour> {
        (0..days * 24)
            .map(|h| {
                let hour_of_day = h % 24;
                let angle = 2.0 * std::f64::consts::PI * (hour_of_day as f64 - 9.0) / 24.0;
                let demand = match hour_of_day {
                    6..=8 => 10.0,
                    12 | 13 => 3.0,
                    17..=20 => 8.0,
                    0..=4 => 0.5,
                    _ => 2.0,
                };
                ProfileHour {
                    ambient: 18.0 + 4.0 * angle.sin(),
                    inlet: 10.0,
                    demand,
                }
            })
            .collect()
    }

    /// Number of steps covered by the profile.
    pub fn available_steps(&self) -> usize {
        self.hours.len() * self.steps_per_hour
    }

    pub fn steps_per_hour(&self) -> usize {
        self.steps_per_hour
    }

    fn step_within_hour(&self) -> usize {
        self.current.step_index % self.steps_per_hour
    }

    fn at_top_of_hour(&self) -> bool {
        self.step_within_hour() == 0
    }

    /// Steps elapsed since the most recent reactivation period began, if the
    /// current step lies inside one.
    fn reactivation_offset(&self) -> Option<usize> {
        if self.reactivation_hours == 0 {
            return None;
        }
        let hour_of_day = self.current.time_of_day.hour;
        self.windows
            .iter()
            .map(|w| w.hours_since_close(hour_of_day))
            .filter(|&since| since < self.reactivation_hours && since <= self.current.hour_of_run)
            .min()
            .map(|since| since * self.steps_per_hour + self.step_within_hour())
    }

    fn zone_span(&self) -> usize {
        (self.reactivation_hours * self.steps_per_hour / self.zones).max(1)
    }
}

impl EnvironmentSource for ProfileEnvironment {
    fn sync_to(&mut self, step: usize) -> Result<()> {
        let hour_of_run = step / self.steps_per_hour;
        let Some(row) = self.hours.get(hour_of_run) else {
            return Err(Error::EnvironmentRange {
                step,
                available: self.available_steps(),
            });
        };

        self.current = EnvironmentSnapshot {
            ambient_temperature: row.ambient,
            inlet_temperature: row.inlet,
            demand_volume: row.demand,
            step_index: step,
            hour_of_run,
            day: hour_of_run / 24,
            time_of_day: TimeOfDay {
                hour: hour_of_run % 24,
                minute: (step % self.steps_per_hour) * 60 / self.steps_per_hour,
            },
        };
        Ok(())
    }

    fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.current
    }

    fn is_at_peak_boundary(&self) -> bool {
        let hour = self.current.time_of_day.hour;
        self.at_top_of_hour() && self.windows.iter().any(|w| w.start_hour == hour)
    }

    fn is_at_non_peak_boundary(&self) -> bool {
        let hour = self.current.time_of_day.hour;
        self.at_top_of_hour() && self.windows.iter().any(|w| w.closing_hour() == hour)
    }

    fn is_in_reactivation_period(&self) -> bool {
        self.reactivation_offset().is_some()
    }

    fn is_at_zone_boundary(&self) -> bool {
        let span = self.zone_span();
        self.reactivation_offset()
            .is_some_and(|offset| offset % span == 0 && offset / span < self.zones)
    }

    fn reactivation_zone_index(&self) -> usize {
        self.reactivation_offset()
            .map(|offset| (offset / self.zone_span()).min(self.zones - 1))
            .unwrap_or(0)
    }

    fn reactivation_hours(&self) -> usize {
        self.reactivation_hours
    }

    fn reactivation_zone_count(&self) -> usize {
        self.zones
    }
}
