//! In-memory cash ledger that fills every market order at its price.

use crate::domain::error::CrossoverError;
use crate::domain::execution::{Fill, Order, Side, calculate_commission, cash_delta};
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBroker {
    cash: f64,
    initial_cash: f64,
    commission_rate: f64,
    position_size: i64,
    total_commission: f64,
}

impl SimulatedBroker {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Self {
        SimulatedBroker {
            cash: initial_cash,
            initial_cash,
            commission_rate,
            position_size: 0,
            total_commission: 0.0,
        }
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }
}

impl BrokerPort for SimulatedBroker {
    fn submit(&mut self, order: &Order) -> Result<Fill, CrossoverError> {
        if order.size <= 0 {
            return Err(CrossoverError::InvalidTransition {
                reason: format!("order size must be positive, got {}", order.size),
            });
        }
        if order.side == Side::Sell && order.size > self.position_size {
            return Err(CrossoverError::InvalidTransition {
                reason: format!(
                    "sell of {} exceeds held size {}",
                    order.size, self.position_size
                ),
            });
        }

        let commission = calculate_commission(order.notional(), self.commission_rate);
        self.cash += cash_delta(order, self.commission_rate);
        self.total_commission += commission;
        self.position_size += match order.side {
            Side::Buy => order.size,
            Side::Sell => -order.size,
        };

        Ok(Fill {
            order: order.clone(),
            commission,
            cash_after: self.cash,
        })
    }

    fn cash(&self) -> f64 {
        self.cash
    }

    fn position_size(&self) -> i64 {
        self.position_size
    }
}
