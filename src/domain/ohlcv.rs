//! OHLCV bar representation.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use super::error::CrossoverError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    fn check_fields(&self) -> Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{name} is not a finite number"));
            }
            if value < 0.0 {
                return Err(format!("{name} must be non-negative, got {value}"));
            }
        }
        Ok(())
    }
}

/// Zone that naive feed timestamps are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedZone {
    Fixed(FixedOffset),
    /// IANA zone such as `Asia/Kolkata`; the offset is resolved per timestamp.
    Named(Tz),
}

impl FeedZone {
    pub fn utc() -> Self {
        FeedZone::Fixed(Utc.fix())
    }

    /// Attach this zone to a wall-clock time. `None` for times skipped or
    /// repeated by a DST transition.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            FeedZone::Fixed(offset) => naive.and_local_timezone(*offset).single(),
            FeedZone::Named(tz) => naive
                .and_local_timezone(*tz)
                .single()
                .map(|dt| dt.fixed_offset()),
        }
    }

    /// The same instant expressed in this zone.
    pub fn convert(&self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            FeedZone::Fixed(offset) => dt.with_timezone(offset),
            FeedZone::Named(tz) => dt.with_timezone(tz).fixed_offset(),
        }
    }
}

impl Default for FeedZone {
    fn default() -> Self {
        FeedZone::utc()
    }
}

impl FromStr for FeedZone {
    type Err = String;

    /// `+05:30` / `-04:00` offsets, `Z` / `UTC`, or an IANA zone name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
            return Ok(FeedZone::utc());
        }
        if value.starts_with('+') || value.starts_with('-') {
            return value
                .parse::<FixedOffset>()
                .map(FeedZone::Fixed)
                .map_err(|e| format!("invalid timezone offset '{value}': {e}"));
        }
        value
            .parse::<Tz>()
            .map(FeedZone::Named)
            .map_err(|_| format!("unknown timezone '{value}', expected +HH:MM or a zone name"))
    }
}

impl fmt::Display for FeedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedZone::Fixed(offset) => write!(f, "{offset}"),
            FeedZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Checks the feed preconditions: finite non-negative prices and strictly
/// increasing timestamps. Rows are reported 1-based.
pub fn validate_bar_sequence(bars: &[OhlcvBar]) -> Result<(), CrossoverError> {
    for (i, bar) in bars.iter().enumerate() {
        bar.check_fields()
            .map_err(|reason| CrossoverError::InputMalformed { row: i + 1, reason })?;

        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            let reason = if bar.timestamp == bars[i - 1].timestamp {
                format!("duplicate timestamp {}", bar.timestamp)
            } else {
                format!(
                    "timestamp {} is earlier than previous {}",
                    bar.timestamp,
                    bars[i - 1].timestamp
                )
            };
            return Err(CrossoverError::InputMalformed { row: i + 1, reason });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn bar_at(minute: u32, close: f64) -> OhlcvBar {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        OhlcvBar {
            timestamp: ist.with_ymd_and_hms(2024, 1, 15, 9, minute, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn ordered_sequence_is_valid() {
        let bars = vec![bar_at(15, 100.0), bar_at(16, 101.0), bar_at(17, 99.0)];
        assert!(validate_bar_sequence(&bars).is_ok());
    }

    #[test]
    fn empty_sequence_is_valid() {
        assert!(validate_bar_sequence(&[]).is_ok());
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let bars = vec![bar_at(15, 100.0), bar_at(15, 101.0)];
        let err = validate_bar_sequence(&bars).unwrap_err();
        assert!(matches!(
            err,
            CrossoverError::InputMalformed { row: 2, ref reason } if reason.contains("duplicate")
        ));
    }

    #[test]
    fn decreasing_timestamp_rejected() {
        let bars = vec![bar_at(15, 100.0), bar_at(17, 101.0), bar_at(16, 102.0)];
        let err = validate_bar_sequence(&bars).unwrap_err();
        assert!(matches!(err, CrossoverError::InputMalformed { row: 3, .. }));
    }

    #[test]
    fn negative_price_rejected() {
        let mut bad = bar_at(16, 100.0);
        bad.low = -1.0;
        let bars = vec![bar_at(15, 100.0), bad];
        let err = validate_bar_sequence(&bars).unwrap_err();
        assert!(matches!(
            err,
            CrossoverError::InputMalformed { row: 2, ref reason } if reason.contains("low")
        ));
    }

    #[test]
    fn nan_close_rejected() {
        let mut bad = bar_at(15, 100.0);
        bad.close = f64::NAN;
        let err = validate_bar_sequence(&[bad]).unwrap_err();
        assert!(matches!(err, CrossoverError::InputMalformed { row: 1, .. }));
    }

    #[test]
    fn feed_zone_parses_offsets_and_names() {
        assert_eq!("+05:30".parse::<FeedZone>().unwrap(), FeedZone::Fixed(ist_offset()));
        assert_eq!(
            "-04:00".parse::<FeedZone>().unwrap(),
            FeedZone::Fixed(FixedOffset::west_opt(4 * 3600).unwrap())
        );
        assert_eq!("Z".parse::<FeedZone>().unwrap(), FeedZone::utc());
        assert_eq!(" utc ".parse::<FeedZone>().unwrap(), FeedZone::utc());
        assert_eq!(
            "Asia/Kolkata".parse::<FeedZone>().unwrap(),
            FeedZone::Named(chrono_tz::Asia::Kolkata)
        );
        assert!("05:30".parse::<FeedZone>().is_err());
        assert!("+05:75".parse::<FeedZone>().is_err());
        assert!("Mars/Olympus".parse::<FeedZone>().is_err());
        assert_eq!(FeedZone::default(), FeedZone::utc());
    }

    #[test]
    fn feed_zone_display() {
        assert_eq!(FeedZone::Fixed(ist_offset()).to_string(), "+05:30");
        assert_eq!(FeedZone::Named(chrono_tz::Asia::Kolkata).to_string(), "Asia/Kolkata");
    }

    #[test]
    fn named_zone_localizes_like_its_offset() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        let named = FeedZone::Named(chrono_tz::Asia::Kolkata).localize(naive).unwrap();
        let fixed = FeedZone::Fixed(ist_offset()).localize(naive).unwrap();
        assert_eq!(named, fixed);
        assert_eq!(named.offset(), &ist_offset());
    }

    #[test]
    fn dst_gap_does_not_localize() {
        // 02:30 does not exist in New York on 2024-03-10
        let naive = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(FeedZone::Named(chrono_tz::America::New_York).localize(naive).is_none());
    }

    #[test]
    fn convert_moves_instant_into_zone() {
        let utc_time = Utc.fix().with_ymd_and_hms(2024, 1, 15, 3, 45, 0).unwrap();
        let converted = FeedZone::Named(chrono_tz::Asia::Kolkata).convert(utc_time);
        assert_eq!(converted, utc_time);
        assert_eq!(converted.offset(), &ist_offset());
        assert_eq!(converted.format("%H:%M").to_string(), "09:15");
    }

    fn ist_offset() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }
}
