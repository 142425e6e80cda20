//! CSV export for replay step records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "time,file_index_Load,connections,pv_wind_connected,next_time";

/// Exports replay records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes replay records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for r in records {
        wtr.write_record(&[
            r.time.to_string(),
            r.file_index_load.to_string(),
            r.connections.to_string(),
            r.pv_wind_connected.to_string(),
            r.next_time.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
