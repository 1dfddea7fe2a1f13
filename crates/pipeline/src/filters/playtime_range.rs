//! Interquartile-range outlier rejection on playtime.

use crate::stats::Quartiles;
use crate::traits::Filter;
use data_loader::InteractionRecord;

/// Keeps records whose playtime lies in `[Q1 - m·IQR, Q3 + m·IQR]`.
///
/// Rejects input errors at the bottom and playtime hoarders at the top, both
/// of which would otherwise dominate the mean used by the next stage.
#[derive(Debug, Clone, Copy)]
pub struct PlaytimeRangeFilter {
    lower: f64,
    upper: f64,
}

impl PlaytimeRangeFilter {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Bounds from fitted quartiles and an IQR multiplier
    pub fn from_quartiles(quartiles: &Quartiles, multiplier: f64) -> Self {
        let (lower, upper) = quartiles.bounds(multiplier);
        Self::new(lower, upper)
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }
}

impl Filter for PlaytimeRangeFilter {
    fn name(&self) -> &str {
        "PlaytimeRangeFilter"
    }

    fn keeps(&self, record: &InteractionRecord) -> bool {
        record.playtime >= self.lower && record.playtime <= self.upper
    }
}
