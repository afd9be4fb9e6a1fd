//! Simple Moving Average indicator.
//!
//! O(1) sliding window over closing prices using a running sum.
//! SMA(n) = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) bars are undefined.

use std::collections::VecDeque;

use crate::domain::error::CrossoverError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Streaming SMA. Owns the series it produces; each `update` appends exactly
/// one point.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    series: IndicatorSeries,
}

impl MovingAverage {
    pub fn new(period: usize) -> Result<Self, CrossoverError> {
        if period == 0 {
            return Err(CrossoverError::InvalidPeriod { period });
        }
        Ok(MovingAverage {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
            series: IndicatorSeries::new(IndicatorType::Sma(period)),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed the next bar; returns the average once `period` closes are in the window.
    pub fn update(&mut self, bar: &OhlcvBar) -> Option<f64> {
        self.window.push_back(bar.close);
        self.sum += bar.close;
        if self.window.len() > self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }

        let value = if self.window.len() == self.period {
            Some(self.sum / self.period as f64)
        } else {
            None
        };

        self.series.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
        value
    }

    pub fn current(&self) -> Option<f64> {
        self.series.last_value()
    }

    pub fn is_warm(&self) -> bool {
        self.window.len() == self.period
    }

    pub fn series(&self) -> &IndicatorSeries {
        &self.series
    }

    pub fn into_series(self) -> IndicatorSeries {
        self.series
    }
}

/// Batch form over a full bar slice.
pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, CrossoverError> {
    let mut sma = MovingAverage::new(period)?;
    for bar in bars {
        sma.update(bar);
    }
    Ok(sma.into_series())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, FixedOffset, TimeZone};
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3).unwrap();

        assert!(!series.points()[0].is_valid());
        assert!(!series.points()[1].is_valid());
        assert!(series.points()[2].is_valid());
        assert!(series.points()[3].is_valid());
        assert!(series.points()[4].is_valid());
        assert_eq!(series.first_valid_index(), Some(2));
    }

    #[test]
    fn sma_known_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3).unwrap();

        assert_relative_eq!(series.value_at(2).unwrap(), 20.0);
        assert_relative_eq!(series.value_at(3).unwrap(), 30.0);
        assert_relative_eq!(series.value_at(4).unwrap(), 40.0);
    }

    #[test]
    fn sma_period_1_tracks_close() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&bars, 1).unwrap();

        for (i, bar) in bars.iter().enumerate() {
            assert_relative_eq!(series.value_at(i).unwrap(), bar.close);
        }
    }

    #[test]
    fn sma_period_0_rejected() {
        assert!(matches!(
            MovingAverage::new(0),
            Err(CrossoverError::InvalidPeriod { period: 0 })
        ));
    }

    #[test]
    fn sma_fewer_bars_than_period() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_valid_index(), None);
    }

    #[test]
    fn sma_series_timestamps_follow_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_sma(&bars, 2).unwrap();
        let stamps: Vec<_> = series.points().iter().map(|p| p.timestamp).collect();
        let expected: Vec<_> = bars.iter().map(|b| b.timestamp).collect();
        assert_eq!(stamps, expected);
        assert_eq!(series.indicator_type, IndicatorType::Sma(2));
    }

    #[test]
    fn streaming_update_matches_current() {
        let bars = make_bars(&[4.0, 8.0, 6.0]);
        let mut sma = MovingAverage::new(2).unwrap();

        assert_eq!(sma.update(&bars[0]), None);
        assert!(!sma.is_warm());
        assert_eq!(sma.update(&bars[1]), Some(6.0));
        assert!(sma.is_warm());
        assert_eq!(sma.update(&bars[2]), Some(7.0));
        assert_eq!(sma.current(), Some(7.0));
        assert_eq!(sma.series().len(), 3);
    }

    proptest! {
        #[test]
        fn sma_matches_brute_force(
            prices in proptest::collection::vec(0.0f64..10_000.0, 0..120),
            period in 1usize..45,
        ) {
            let bars = make_bars(&prices);
            let series = calculate_sma(&bars, period).unwrap();
            prop_assert_eq!(series.len(), prices.len());

            for i in 0..prices.len() {
                match series.value_at(i) {
                    None => prop_assert!(i + 1 < period),
                    Some(v) => {
                        prop_assert!(i + 1 >= period);
                        let window = &prices[i + 1 - period..=i];
                        let expected = window.iter().sum::<f64>() / period as f64;
                        prop_assert!((v - expected).abs() <= 1e-6 * expected.abs().max(1.0));
                    }
                }
            }
        }
    }
}
