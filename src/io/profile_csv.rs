//! CSV loader for hourly environment profiles.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::sim::profile::ProfileHour;

#[derive(Debug, Deserialize)]
struct ProfileRow {
    hour: usize,
    ambient: f64,
    inlet: f64,
    demand: f64,
}

/// Loads an hourly profile from a CSV file with header `hour,ambient,inlet,demand`.
///
/// # Errors
///
/// Returns `Error::Io` / `Error::Csv` for unreadable input and
/// `Error::Configuration` if hours are not contiguous from 0 or a value is
/// not finite.
pub fn load_profile(path: &Path) -> Result<Vec<ProfileHour>> {
    let file = File::open(path)?;
    read_profile(file)
}

/// Reads an hourly profile from any reader.
///
/// # Errors
///
/// See [`load_profile`].
pub fn read_profile(reader: impl Read) -> Result<Vec<ProfileHour>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut hours = Vec::new();

    for (expected, row) in rdr.deserialize::<ProfileRow>().enumerate() {
        let row = row?;
        if row.hour != expected {
            return Err(Error::Configuration(format!(
                "profile row {expected} has hour {}, hours must be contiguous from 0",
                row.hour
            )));
        }
        if !(row.ambient.is_finite() && row.inlet.is_finite() && row.demand.is_finite()) {
            return Err(Error::Configuration(format!(
                "profile hour {} has a non-finite value",
                row.hour
            )));
        }
        if row.demand < 0.0 {
            return Err(Error::Configuration(format!(
                "profile hour {} has negative demand",
                row.hour
            )));
        }
        hours.push(ProfileHour {
            ambient: row.ambient,
            inlet: row.inlet,
            demand: row.demand,
        });
    }

    Ok(hours)
}
