//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod crossover;
pub mod position;
pub mod execution;
pub mod journal;
pub mod backtest;
pub mod config_validation;
pub mod error;
