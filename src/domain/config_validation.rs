//! Configuration loading and validation.
//!
//! Keys are read with `get_parsed`, so a present but malformed value is an
//! error instead of a silent default. Range checks run on the assembled
//! `BacktestConfig`, after any command-line overrides have been applied.

use crate::domain::backtest::{
    BacktestConfig, DEFAULT_COMMISSION, DEFAULT_FAST_PERIOD, DEFAULT_INITIAL_CASH,
    DEFAULT_SLOW_PERIOD, DEFAULT_TRADE_SIZE,
};
use crate::domain::error::CrossoverError;
use crate::domain::ohlcv::FeedZone;
use crate::ports::config_port::{ConfigPort, get_parsed};

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CrossoverError {
    CrossoverError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Read strategy and backtest parameters, applying defaults for absent keys.
pub fn read_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, CrossoverError> {
    Ok(BacktestConfig {
        fast_period: get_parsed(config, "strategy", "fast_period", DEFAULT_FAST_PERIOD)?,
        slow_period: get_parsed(config, "strategy", "slow_period", DEFAULT_SLOW_PERIOD)?,
        trade_size: get_parsed(config, "strategy", "trade_size", DEFAULT_TRADE_SIZE)?,
        exit_cross: get_parsed(config, "strategy", "exit_cross", Default::default())?,
        initial_cash: get_parsed(config, "backtest", "initial_cash", DEFAULT_INITIAL_CASH)?,
        commission: get_parsed(config, "backtest", "commission", DEFAULT_COMMISSION)?,
        journal_write: get_parsed(config, "backtest", "journal_write", Default::default())?,
    })
}

/// `[backtest] timezone`, defaulting to UTC.
pub fn read_timezone(config: &dyn ConfigPort) -> Result<FeedZone, CrossoverError> {
    get_parsed(config, "backtest", "timezone", FeedZone::utc())
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), CrossoverError> {
    validate_periods(config)?;
    validate_trade_size(config)?;
    validate_initial_cash(config)?;
    validate_commission(config)?;
    Ok(())
}

/// Full check of a config source: every key parses and every value is in range.
pub fn validate_config(config: &dyn ConfigPort) -> Result<BacktestConfig, CrossoverError> {
    let backtest = read_backtest_config(config)?;
    validate_backtest_config(&backtest)?;
    read_timezone(config)?;
    Ok(backtest)
}

fn validate_periods(config: &BacktestConfig) -> Result<(), CrossoverError> {
    if config.fast_period == 0 {
        return Err(invalid("strategy", "fast_period", "fast_period must be at least 1"));
    }
    if config.slow_period == 0 {
        return Err(invalid("strategy", "slow_period", "slow_period must be at least 1"));
    }
    if config.fast_period >= config.slow_period {
        return Err(invalid(
            "strategy",
            "fast_period",
            format!(
                "fast_period ({}) must be less than slow_period ({})",
                config.fast_period, config.slow_period
            ),
        ));
    }
    Ok(())
}

fn validate_trade_size(config: &BacktestConfig) -> Result<(), CrossoverError> {
    if config.trade_size < 1 {
        return Err(invalid("strategy", "trade_size", "trade_size must be at least 1"));
    }
    Ok(())
}

fn validate_initial_cash(config: &BacktestConfig) -> Result<(), CrossoverError> {
    if !config.initial_cash.is_finite() || config.initial_cash <= 0.0 {
        return Err(invalid("backtest", "initial_cash", "initial_cash must be positive"));
    }
    Ok(())
}

fn validate_commission(config: &BacktestConfig) -> Result<(), CrossoverError> {
    if !(0.0..1.0).contains(&config.commission) {
        return Err(invalid(
            "backtest",
            "commission",
            "commission must be a fraction between 0 and 1",
        ));
    }
    Ok(())
}
