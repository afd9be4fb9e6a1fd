//! Bar feed port trait.

use crate::domain::error::CrossoverError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Load the full bar feed in ascending timestamp order.
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, CrossoverError>;

    /// Human-readable origin of the feed, for logging.
    fn describe(&self) -> String;
}
