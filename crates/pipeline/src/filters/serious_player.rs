//! Keep only seriously engaged players.

use crate::traits::Filter;
use data_loader::InteractionRecord;

/// Keeps records whose playtime is at least `multiplier × mean`.
///
/// `mean` must be the post-outlier-removal mean; the filter itself does not
/// compute it.
#[derive(Debug, Clone, Copy)]
pub struct SeriousPlayerFilter {
    floor: f64,
}

impl SeriousPlayerFilter {
    pub fn new(mean_playtime: f64, multiplier: f64) -> Self {
        Self {
            floor: mean_playtime * multiplier,
        }
    }

    /// Minimum playtime a record needs to survive
    pub fn floor(&self) -> f64 {
        self.floor
    }
}

impl Filter for SeriousPlayerFilter {
    fn name(&self) -> &str {
        "SeriousPlayerFilter"
    }

    fn keeps(&self, record: &InteractionRecord) -> bool {
        record.playtime >= self.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(playtime: f64) -> InteractionRecord {
        InteractionRecord {
            item_id: 1,
            item_name: "GameA".to_string(),
            review_id: 1,
            language: "english".to_string(),
            actor_id: 76_561_198_000_000_001,
            timestamp: 0,
            playtime,
            recommended: Some(false),
        }
    }

    #[test]
    fn test_serious_player_floor() {
        let filter = SeriousPlayerFilter::new(4.6, 5.0);
        assert!((filter.floor() - 23.0).abs() < 1e-9);
        assert!(filter.keeps(&record(28.0)));
        assert!(filter.keeps(&record(23.0)));
        assert!(!filter.keeps(&record(10.0)));
    }
}
