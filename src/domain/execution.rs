//! Market orders and fills.
//!
//! Orders always execute at the bar close they were issued on; there is no
//! slippage or partial-fill modeling. Commission is proportional to notional.

use chrono::{DateTime, FixedOffset};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: Side,
    pub size: i64,
    pub price: f64,
    pub time: DateTime<FixedOffset>,
}

impl Order {
    pub fn notional(&self) -> f64 {
        self.size as f64 * self.price
    }
}

/// Result of executing an order against the cash ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub order: Order,
    pub commission: f64,
    pub cash_after: f64,
}

/// Calculate commission: trade_value * rate (rate is a fraction, 0.002 = 0.2%).
pub fn calculate_commission(trade_value: f64, commission_rate: f64) -> f64 {
    trade_value.abs() * commission_rate
}

/// Cash change for an executed order: buys debit notional plus commission,
/// sells credit notional minus commission.
pub fn cash_delta(order: &Order, commission_rate: f64) -> f64 {
    let notional = order.notional();
    let commission = calculate_commission(notional, commission_rate);
    match order.side {
        Side::Buy => -(notional + commission),
        Side::Sell => notional - commission,
    }
}
