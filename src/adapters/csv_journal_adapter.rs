//! CSV trade journal writer.
//!
//! Each write replaces the whole file, so the file always holds exactly the
//! journal passed to the most recent `write`.

use crate::domain::error::CrossoverError;
use crate::domain::journal::TradeRecord;
use crate::ports::journal_port::JournalPort;
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const JOURNAL_HEADER: [&str; 5] = ["entry_time", "entry_price", "exit_time", "exit_price", "size"];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

fn format_time(t: &DateTime<FixedOffset>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Prices always carry a decimal point: `100.0`, never `100`.
fn format_price(price: f64) -> String {
    format!("{price:?}")
}

/// Render the journal as CSV text.
pub fn render_journal<W: Write>(records: &[TradeRecord], out: W) -> Result<(), CrossoverError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(JOURNAL_HEADER)?;

    for record in records {
        wtr.write_record([
            format_time(&record.entry_time),
            format_price(record.entry_price),
            record.exit_time.as_ref().map(format_time).unwrap_or_default(),
            record.exit_price.map(format_price).unwrap_or_default(),
            record.size.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub struct CsvJournalWriter {
    path: PathBuf,
}

impl CsvJournalWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalPort for CsvJournalWriter {
    fn write(&mut self, records: &[TradeRecord]) -> Result<(), CrossoverError> {
        let mut buf = Vec::new();
        render_journal(records, &mut buf)?;
        fs::write(&self.path, buf).map_err(|e| {
            CrossoverError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write {}: {}", self.path.display(), e),
            ))
        })?;
        debug!(path = %self.path.display(), records = records.len(), "journal written");
        Ok(())
    }
}
