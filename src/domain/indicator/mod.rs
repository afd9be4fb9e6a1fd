//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: An append-only time series of indicator values

pub mod sma;

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// One value per bar. `value` is `None` while the indicator is warming up.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType) -> Self {
        IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, point: IndicatorPoint) {
        self.values.push(point);
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    /// Index of the first bar with a defined value.
    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(IndicatorPoint::is_valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
        }
    }
}
