//! Thresholds and multipliers for the interaction filter.

use data_loader::ActorId;
use serde::{Deserialize, Serialize};

/// Lowest valid account id in the reviewer id namespace
pub const MIN_VALID_ACTOR_ID: ActorId = 76_560_000_000_000_000;

/// Filter parameters. Defaults define the serious-player cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Items with fewer reviews than this are dropped (inclusive bound)
    pub min_item_reviews: usize,
    /// Playtime bounds are `[Q1 - m·IQR, Q3 + m·IQR]`
    pub iqr_multiplier: f64,
    /// Serious players have playtime ≥ this multiple of the post-outlier mean
    pub serious_multiplier: f64,
    pub min_actor_id: ActorId,
    /// Rating for a positive recommendation flag
    pub high_rating: f32,
    /// Rating for a negative or absent flag
    pub low_rating: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_item_reviews: 200,
            iqr_multiplier: 2.0,
            serious_multiplier: 5.0,
            min_actor_id: MIN_VALID_ACTOR_ID,
            high_rating: 5.0,
            low_rating: 1.0,
        }
    }
}

impl FilterConfig {
    pub fn with_min_item_reviews(mut self, min: usize) -> Self {
        self.min_item_reviews = min;
        self
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    pub fn with_serious_multiplier(mut self, multiplier: f64) -> Self {
        self.serious_multiplier = multiplier;
        self
    }

    pub fn with_min_actor_id(mut self, floor: ActorId) -> Self {
        self.min_actor_id = floor;
        self
    }
}
