//! Backtest engine and bar loop.
//!
//! One bar at a time: indicators, crossover detectors, position state
//! machine, broker, journal, in that order. Nothing for bar `i + 1` runs until
//! bar `i` has been fully processed.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::crossover::{ExitCross, SignalPipeline};
use super::error::CrossoverError;
use super::execution::{Fill, Order, Side};
use super::indicator::IndicatorSeries;
use super::journal::TradeJournal;
use super::ohlcv::{OhlcvBar, validate_bar_sequence};
use super::position::PositionMachine;
use crate::ports::broker_port::BrokerPort;
use crate::ports::journal_port::JournalPort;

pub const DEFAULT_FAST_PERIOD: usize = 9;
pub const DEFAULT_SLOW_PERIOD: usize = 40;
pub const DEFAULT_TRADE_SIZE: i64 = 50;
pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_COMMISSION: f64 = 0.002;

/// When the journal is handed to the `JournalPort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JournalWrite {
    /// After the first bar, after every bar that opened or closed a trade,
    /// and once more at the end.
    #[default]
    OnChange,
    /// Once, after the last bar.
    AtEnd,
}

impl FromStr for JournalWrite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on_change" => Ok(JournalWrite::OnChange),
            "at_end" => Ok(JournalWrite::AtEnd),
            other => Err(format!(
                "unknown journal write mode '{other}', expected on_change or at_end"
            )),
        }
    }
}

impl fmt::Display for JournalWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalWrite::OnChange => write!(f, "on_change"),
            JournalWrite::AtEnd => write!(f, "at_end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub trade_size: i64,
    pub initial_cash: f64,
    pub commission: f64,
    pub exit_cross: ExitCross,
    pub journal_write: JournalWrite,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            fast_period: DEFAULT_FAST_PERIOD,
            slow_period: DEFAULT_SLOW_PERIOD,
            trade_size: DEFAULT_TRADE_SIZE,
            initial_cash: DEFAULT_INITIAL_CASH,
            commission: DEFAULT_COMMISSION,
            exit_cross: ExitCross::default(),
            journal_write: JournalWrite::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub journal: TradeJournal,
    pub orders: Vec<Order>,
    pub fills: Vec<Fill>,
    pub bars_processed: usize,
    pub starting_value: f64,
    pub ending_value: f64,
    pub final_cash: f64,
    pub fast_series: IndicatorSeries,
    pub slow_series: IndicatorSeries,
}

impl BacktestResult {
    pub fn buy_count(&self) -> usize {
        self.orders.iter().filter(|o| o.side == Side::Buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.orders.iter().filter(|o| o.side == Side::Sell).count()
    }

    pub fn total_commission(&self) -> f64 {
        self.fills.iter().map(|f| f.commission).sum()
    }
}

/// Replay `bars` through the strategy.
///
/// The bar sequence is validated before the first bar is simulated; a
/// malformed feed aborts without touching the broker or the sink.
pub fn run_backtest(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
    broker: &mut dyn BrokerPort,
    sink: &mut dyn JournalPort,
) -> Result<BacktestResult, CrossoverError> {
    validate_bar_sequence(bars)?;

    let mut pipeline = SignalPipeline::new(config.fast_period, config.slow_period, config.exit_cross)?;
    let mut machine = PositionMachine::new(config.trade_size)?;
    let mut journal = TradeJournal::new();
    let mut orders = Vec::new();
    let mut fills = Vec::new();

    let starting_value = broker.cash();
    info!(
        bars = bars.len(),
        fast = config.fast_period,
        slow = config.slow_period,
        trade_size = config.trade_size,
        "starting backtest"
    );

    for (i, bar) in bars.iter().enumerate() {
        let step = pipeline.update(bar);
        debug!(
            time = %bar.timestamp,
            close = bar.close,
            fast = ?step.fast,
            slow = ?step.slow,
            cross_up = step.signals.cross_up,
            cross_down = step.signals.cross_down,
            "bar"
        );

        let order = machine.on_bar(step.signals, bar)?;
        let changed = order.is_some();

        if let Some(order) = order {
            match order.side {
                Side::Buy => journal.open_trade(order.time, order.price, order.size)?,
                Side::Sell => journal.close_trade(order.time, order.price)?,
            }

            let fill = broker.submit(&order)?;
            info!(
                side = %order.side,
                time = %order.time,
                price = order.price,
                size = order.size,
                commission = fill.commission,
                cash = fill.cash_after,
                "order executed"
            );
            if fill.cash_after < 0.0 {
                warn!(cash = fill.cash_after, "cash balance is negative");
            }

            orders.push(order);
            fills.push(fill);
        }

        if config.journal_write == JournalWrite::OnChange && (changed || i == 0) {
            sink.write(journal.export())?;
        }
    }

    sink.write(journal.export())?;

    let ending_value = match bars.last() {
        Some(bar) => broker.value(bar.close),
        None => broker.cash(),
    };

    if let Some(open) = journal.open_record() {
        info!(
            entry_time = %open.entry_time,
            entry_price = open.entry_price,
            "feed ended with an open position"
        );
    }

    let (fast, slow) = pipeline.into_averages();

    Ok(BacktestResult {
        journal,
        orders,
        fills,
        bars_processed: bars.len(),
        starting_value,
        ending_value,
        final_cash: broker.cash(),
        fast_series: fast.into_series(),
        slow_series: slow.into_series(),
    })
}
