//! Crossover detection over the fast and slow moving averages.
//!
//! # Evaluation Semantics
//!
//! - `CrossDetector::above(a, b)` fires when `a[i-1] <= b[i-1]` and `a[i] > b[i]`
//! - `CrossDetector::below(a, b)` fires when `a[i-1] >= b[i-1]` and `a[i] < b[i]`
//! - Either series undefined at `i-1` or `i` means no event, so nothing fires on
//!   the first bar a series becomes defined.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::CrossoverError;
use crate::domain::indicator::sma::MovingAverage;
use crate::domain::ohlcv::OhlcvBar;

/// Which moving average a detector operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Fast,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDirection {
    Above,
    Below,
}

/// Operand order for the exit detector.
///
/// The default compares slow against fast, so it fires on the same bars as
/// the entry detector: a long position is closed on the next fast-over-slow
/// crossing after the one that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitCross {
    /// Fast average crosses below the slow one; the mirror of the entry signal.
    FastBelowSlow,
    /// Slow average crosses below the fast one.
    #[default]
    SlowBelowFast,
}

impl ExitCross {
    fn detector(self) -> CrossDetector {
        match self {
            ExitCross::FastBelowSlow => CrossDetector::below(Leg::Fast, Leg::Slow),
            ExitCross::SlowBelowFast => CrossDetector::below(Leg::Slow, Leg::Fast),
        }
    }
}

impl FromStr for ExitCross {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast_below_slow" => Ok(ExitCross::FastBelowSlow),
            "slow_below_fast" => Ok(ExitCross::SlowBelowFast),
            other => Err(format!(
                "unknown exit cross '{other}', expected fast_below_slow or slow_below_fast"
            )),
        }
    }
}

impl fmt::Display for ExitCross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCross::FastBelowSlow => write!(f, "fast_below_slow"),
            ExitCross::SlowBelowFast => write!(f, "slow_below_fast"),
        }
    }
}

/// `a` crossed above `b` between the previous and current bar.
pub fn crossed_above(a_prev: f64, b_prev: f64, a_curr: f64, b_curr: f64) -> bool {
    a_prev <= b_prev && a_curr > b_curr
}

/// `a` crossed below `b` between the previous and current bar.
pub fn crossed_below(a_prev: f64, b_prev: f64, a_curr: f64, b_curr: f64) -> bool {
    a_prev >= b_prev && a_curr < b_curr
}

/// Stateful detector comparing two legs bar over bar.
#[derive(Debug, Clone)]
pub struct CrossDetector {
    direction: CrossDirection,
    left: Leg,
    right: Leg,
    prev: Option<(f64, f64)>,
}

impl CrossDetector {
    pub fn above(left: Leg, right: Leg) -> Self {
        Self::new(CrossDirection::Above, left, right)
    }

    pub fn below(left: Leg, right: Leg) -> Self {
        Self::new(CrossDirection::Below, left, right)
    }

    fn new(direction: CrossDirection, left: Leg, right: Leg) -> Self {
        CrossDetector {
            direction,
            left,
            right,
            prev: None,
        }
    }

    pub fn direction(&self) -> CrossDirection {
        self.direction
    }

    /// Feed this bar's fast/slow values; returns whether the cross fired.
    pub fn update(&mut self, fast: Option<f64>, slow: Option<f64>) -> bool {
        let pick = |leg: Leg| match leg {
            Leg::Fast => fast,
            Leg::Slow => slow,
        };
        let curr = match (pick(self.left), pick(self.right)) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        };

        let fired = match (self.prev, curr) {
            (Some((a_prev, b_prev)), Some((a, b))) => match self.direction {
                CrossDirection::Above => crossed_above(a_prev, b_prev, a, b),
                CrossDirection::Below => crossed_below(a_prev, b_prev, a, b),
            },
            _ => false,
        };

        self.prev = curr;
        fired
    }
}

/// Explicit crossover events for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossSignals {
    pub cross_up: bool,
    pub cross_down: bool,
}

/// Indicator values and events produced for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSignals {
    pub fast: Option<f64>,
    pub slow: Option<f64>,
    pub signals: CrossSignals,
}

/// Fast and slow averages feeding an entry and an exit detector.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    fast: MovingAverage,
    slow: MovingAverage,
    entry: CrossDetector,
    exit: CrossDetector,
}

impl SignalPipeline {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        exit_cross: ExitCross,
    ) -> Result<Self, CrossoverError> {
        Ok(SignalPipeline {
            fast: MovingAverage::new(fast_period)?,
            slow: MovingAverage::new(slow_period)?,
            entry: CrossDetector::above(Leg::Fast, Leg::Slow),
            exit: exit_cross.detector(),
        })
    }

    pub fn update(&mut self, bar: &OhlcvBar) -> BarSignals {
        let fast = self.fast.update(bar);
        let slow = self.slow.update(bar);
        let signals = CrossSignals {
            cross_up: self.entry.update(fast, slow),
            cross_down: self.exit.update(fast, slow),
        };
        BarSignals {
            fast,
            slow,
            signals,
        }
    }

    pub fn fast(&self) -> &MovingAverage {
        &self.fast
    }

    pub fn slow(&self) -> &MovingAverage {
        &self.slow
    }

    pub fn into_averages(self) -> (MovingAverage, MovingAverage) {
        (self.fast, self.slow)
    }
}
