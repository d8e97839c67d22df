//! CSV export for per-step aggregate records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::AggregateRecord;

/// Population CSV column header. Field order is stable for downstream tools.
pub const HEADER: &str = "time_step,temperature,total_on,total_low,inlet,ambient,demand,\
                          temp_pstdev,temp_median,temp_lowest,temp_highest,\
                          comms_on,non_comms_on,total_population_size,\
                          total_comms_population_size,comms_temps_mean,comms_temps_pstdev,\
                          comms_temps_lowest,comms_temps_highest,non_comms_mean,\
                          non_comms_temps_pstdev,non_comms_temps_lowest,non_comms_temps_highest";

/// Exports aggregate records to a CSV file at the given path.
///
/// Writes a header row followed by one row per record, in record order.
/// An empty record slice produces a header-only file.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_csv(records: &[AggregateRecord], path: &Path) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes aggregate records as CSV to any writer.
///
/// The header is written explicitly so an empty slice still yields one.
/// Rows go through the record's `Serialize` impl, whose field order
/// matches [`HEADER`]. Floats use shortest round-trip formatting, so
/// identical runs produce byte-identical output.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv(records: &[AggregateRecord], writer: impl Write) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;
    for r in records {
        wtr.serialize(r)?;
    }

    wtr.flush()?;
    Ok(())
}
