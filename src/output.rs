//! Output formatting and persistence for transform results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append. These are
//! the plain-data boundary the presentation layer consumes; there is no
//! wire protocol beyond flat records.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Logs a record using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(record: &T) {
    debug!("{:#?}", record);
}

/// Writes a record as pretty-printed JSON to stdout.
pub fn print_json<T: Serialize>(record: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, record)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Appends a serializable record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &str, record: &T) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
