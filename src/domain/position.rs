//! Position tracking and the FLAT/LONG state machine.

use chrono::{DateTime, FixedOffset};
use std::fmt;

use super::crossover::CrossSignals;
use super::error::CrossoverError;
use super::execution::{Order, Side};
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub size: i64,
    pub entry_price: f64,
    pub entry_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(Position),
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionState::Flat => write!(f, "FLAT"),
            PositionState::Long(_) => write!(f, "LONG"),
        }
    }
}

/// Single-position long-only state machine with a fixed trade size.
#[derive(Debug, Clone)]
pub struct PositionMachine {
    trade_size: i64,
    state: PositionState,
}

impl PositionMachine {
    pub fn new(trade_size: i64) -> Result<Self, CrossoverError> {
        if trade_size <= 0 {
            return Err(CrossoverError::InvalidTransition {
                reason: format!("trade size must be positive, got {trade_size}"),
            });
        }
        Ok(PositionMachine {
            trade_size,
            state: PositionState::Flat,
        })
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn trade_size(&self) -> i64 {
        self.trade_size
    }

    pub fn is_long(&self) -> bool {
        matches!(self.state, PositionState::Long(_))
    }

    /// Current held size: 0 when flat, `trade_size` when long.
    pub fn size(&self) -> i64 {
        match &self.state {
            PositionState::Flat => 0,
            PositionState::Long(pos) => pos.size,
        }
    }

    /// Evaluates this bar's events. Cross-up only matters while flat,
    /// cross-down only while long.
    pub fn on_bar(
        &mut self,
        signals: CrossSignals,
        bar: &OhlcvBar,
    ) -> Result<Option<Order>, CrossoverError> {
        match (self.is_long(), signals) {
            (false, CrossSignals { cross_up: true, .. }) => self.buy(bar).map(Some),
            (true, CrossSignals { cross_down: true, .. }) => self.sell(bar).map(Some),
            _ => Ok(None),
        }
    }

    pub fn buy(&mut self, bar: &OhlcvBar) -> Result<Order, CrossoverError> {
        if let PositionState::Long(pos) = &self.state {
            return Err(CrossoverError::InvalidTransition {
                reason: format!(
                    "buy at {} while already long {} since {}",
                    bar.timestamp, pos.size, pos.entry_time
                ),
            });
        }

        self.state = PositionState::Long(Position {
            size: self.trade_size,
            entry_price: bar.close,
            entry_time: bar.timestamp,
        });

        Ok(Order {
            side: Side::Buy,
            size: self.trade_size,
            price: bar.close,
            time: bar.timestamp,
        })
    }

    /// Sells the entire held size.
    pub fn sell(&mut self, bar: &OhlcvBar) -> Result<Order, CrossoverError> {
        let size = match &self.state {
            PositionState::Flat => {
                return Err(CrossoverError::InvalidTransition {
                    reason: format!("sell at {} while flat", bar.timestamp),
                });
            }
            PositionState::Long(pos) => pos.size,
        };

        self.state = PositionState::Flat;

        Ok(Order {
            side: Side::Sell,
            size,
            price: bar.close,
            time: bar.timestamp,
        })
    }
}
