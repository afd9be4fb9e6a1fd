//! Broker / cash ledger port trait.

use crate::domain::error::CrossoverError;
use crate::domain::execution::{Fill, Order};

pub trait BrokerPort {
    /// Execute a market order at its price.
    fn submit(&mut self, order: &Order) -> Result<Fill, CrossoverError>;

    fn cash(&self) -> f64;

    fn position_size(&self) -> i64;

    /// Cash plus the held position marked at `mark_price`.
    fn value(&self, mark_price: f64) -> f64 {
        self.cash() + self.position_size() as f64 * mark_price
    }
}
