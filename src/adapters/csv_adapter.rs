//! CSV file bar feed adapter.

use crate::domain::error::CrossoverError;
use crate::domain::ohlcv::{FeedZone, OhlcvBar, validate_bar_sequence};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

const TIMESTAMP_COLUMNS: [&str; 3] = ["timestamp", "datetime", "date"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell. Offsets in the value are honoured and converted to
/// `zone`; naive values are taken to be local time in `zone`.
pub fn parse_timestamp(value: &str, zone: FeedZone) -> Result<DateTime<FixedOffset>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(zone.convert(dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(zone.convert(dt));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid timestamp '{value}'"))?;

    zone.localize(naive)
        .ok_or_else(|| format!("timestamp '{value}' is ambiguous or skipped in {zone}"))
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CrossoverError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| CrossoverError::MissingColumn {
                    column: column.to_string(),
                })
        };

        let timestamp = TIMESTAMP_COLUMNS
            .iter()
            .find_map(|c| names.iter().position(|n| n == c))
            .ok_or_else(|| CrossoverError::MissingColumn {
                column: "timestamp".to_string(),
            })?;

        Ok(Columns {
            timestamp,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

pub struct CsvBarAdapter {
    path: PathBuf,
    timezone: FeedZone,
}

impl CsvBarAdapter {
    pub fn new(path: PathBuf, timezone: FeedZone) -> Self {
        Self { path, timezone }
    }

    /// Parse bars from any reader. Row numbers in errors are 1-based data rows.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<OhlcvBar>, CrossoverError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let columns = Columns::locate(rdr.headers()?)?;
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result?;

            let field = |index: usize, name: &str| {
                record.get(index).ok_or_else(|| CrossoverError::InputMalformed {
                    row,
                    reason: format!("missing {name} value"),
                })
            };
            let number = |index: usize, name: &str| -> Result<f64, CrossoverError> {
                field(index, name)?
                    .parse::<f64>()
                    .map_err(|e| CrossoverError::InputMalformed {
                        row,
                        reason: format!("invalid {name} value: {e}"),
                    })
            };

            let timestamp = parse_timestamp(field(columns.timestamp, "timestamp")?, self.timezone)
                .map_err(|reason| CrossoverError::InputMalformed { row, reason })?;

            bars.push(OhlcvBar {
                timestamp,
                open: number(columns.open, "open")?,
                high: number(columns.high, "high")?,
                low: number(columns.low, "low")?,
                close: number(columns.close, "close")?,
                volume: number(columns.volume, "volume")?,
            });
        }

        validate_bar_sequence(&bars)?;
        Ok(bars)
    }
}

impl DataPort for CsvBarAdapter {
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, CrossoverError> {
        let file = File::open(&self.path).map_err(|e| {
            CrossoverError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", self.path.display(), e),
            ))
        })?;
        let bars = self.parse(file)?;
        debug!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
