//! Trade journal: an append-only list of trade records where only the last
//! record's exit fields may be filled in.

use chrono::{DateTime, FixedOffset};

use super::error::CrossoverError;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub entry_time: DateTime<FixedOffset>,
    pub entry_price: f64,
    pub exit_time: Option<DateTime<FixedOffset>>,
    pub exit_price: Option<f64>,
    pub size: i64,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Price PnL of a closed record; commission is not part of the journal.
    pub fn pnl(&self) -> Option<f64> {
        self.exit_price
            .map(|exit| self.size as f64 * (exit - self.entry_price))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeJournal {
    records: Vec<TradeRecord>,
}

impl TradeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new open record. Fails if the last record is still open.
    pub fn open_trade(
        &mut self,
        entry_time: DateTime<FixedOffset>,
        entry_price: f64,
        size: i64,
    ) -> Result<(), CrossoverError> {
        if let Some(open) = self.open_record() {
            return Err(CrossoverError::JournalViolation {
                reason: format!(
                    "cannot open trade at {entry_time}: trade opened at {} is still open",
                    open.entry_time
                ),
            });
        }

        self.records.push(TradeRecord {
            entry_time,
            entry_price,
            exit_time: None,
            exit_price: None,
            size,
        });
        Ok(())
    }

    /// Fills the exit fields of the last record. Fails if there is no open
    /// record or the exit does not come after the entry.
    pub fn close_trade(
        &mut self,
        exit_time: DateTime<FixedOffset>,
        exit_price: f64,
    ) -> Result<(), CrossoverError> {
        let last = match self.records.last_mut() {
            Some(record) if record.is_open() => record,
            _ => {
                return Err(CrossoverError::JournalViolation {
                    reason: format!("cannot close trade at {exit_time}: no open trade"),
                });
            }
        };

        if exit_time <= last.entry_time {
            return Err(CrossoverError::JournalViolation {
                reason: format!(
                    "exit time {exit_time} is not after entry time {}",
                    last.entry_time
                ),
            });
        }

        last.exit_time = Some(exit_time);
        last.exit_price = Some(exit_price);
        Ok(())
    }

    /// The full ordered record sequence, for persistence.
    pub fn export(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn open_record(&self) -> Option<&TradeRecord> {
        self.records.last().filter(|r| r.is_open())
    }

    pub fn closed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_open()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TradeRecord> {
        self.records
    }
}
