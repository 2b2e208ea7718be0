//! CSV export of per-tick race results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::{ResultKey, RunResults};

/// Per-tick keys, in column order.
fn columns() -> impl Iterator<Item = ResultKey> {
    ResultKey::ALL.into_iter().filter(|k| k.is_per_tick())
}

/// Exports per-tick results to a CSV file at the given path.
///
/// Writes a header row of result-key names followed by one row per simulated
/// tick. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &RunResults, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes per-tick results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &RunResults, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(columns().map(ResultKey::as_str))?;

    let values: Vec<_> = columns().map(|k| results.get(k)).collect();
    for tick in 0..results.len() {
        wtr.write_record(values.iter().map(|v| v.cell(tick)))?;
    }

    wtr.flush()?;
    Ok(())
}
