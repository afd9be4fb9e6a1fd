#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use smacross::domain::backtest::BacktestConfig;
use smacross::domain::error::CrossoverError;
use smacross::domain::journal::TradeRecord;
pub use smacross::domain::ohlcv::{FeedZone, OhlcvBar};
use smacross::ports::data_port::DataPort;
use smacross::ports::journal_port::JournalPort;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<OhlcvBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, CrossoverError> {
        if let Some(reason) = &self.error {
            return Err(CrossoverError::Io(std::io::Error::other(reason.clone())));
        }
        Ok(self.bars.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Keeps every snapshot handed to it.
#[derive(Default)]
pub struct MemorySink {
    pub writes: Vec<Vec<TradeRecord>>,
}

impl MemorySink {
    pub fn last(&self) -> &[TradeRecord] {
        self.writes.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl JournalPort for MemorySink {
    fn write(&mut self, records: &[TradeRecord]) -> Result<(), CrossoverError> {
        self.writes.push(records.to_vec());
        Ok(())
    }
}

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
}

pub fn ist_zone() -> FeedZone {
    FeedZone::Fixed(ist())
}

pub fn start_time() -> DateTime<FixedOffset> {
    ist().with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap()
}

pub fn make_bar(minute: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: start_time() + Duration::minutes(minute),
        open: close,
        high: close + 0.5,
        low: (close - 0.5).max(0.0),
        close,
        volume: 1000.0,
    }
}

/// One bar per minute from 09:15 IST with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect()
}

/// `flat` bars at `level`, then `rising` bars climbing by `step`.
pub fn flat_then_rising(flat: usize, rising: usize, level: f64, step: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..flat)
        .map(|_| level)
        .chain((1..=rising).map(|i| level + step * i as f64))
        .collect();
    bars_from_closes(&closes)
}

/// Rise, fall, rise, fall: produces several full round trips with the default periods.
pub fn oscillating_closes(cycles: usize, half_period: usize) -> Vec<f64> {
    let mut closes = Vec::new();
    let mut price = 100.0;
    for _ in 0..cycles {
        for _ in 0..half_period {
            price += 1.0;
            closes.push(price);
        }
        for _ in 0..half_period {
            price -= 1.0;
            closes.push(price);
        }
    }
    closes
}

pub fn csv_text(bars: &[OhlcvBar]) -> String {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for bar in bars {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    text
}

pub fn zero_commission_config() -> BacktestConfig {
    BacktestConfig {
        commission: 0.0,
        ..BacktestConfig::default()
    }
}
