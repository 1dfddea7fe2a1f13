//! Recommendation flag → numeric rating.
//!
//! The factorization engine consumes ratings, the review dump only has a
//! thumbs up/down flag. A positive flag maps to the high rating, anything
//! else (negative or missing) to the low one.

use crate::config::FilterConfig;
use data_loader::{FilteredInteraction, InteractionRecord};
use rayon::prelude::*;

pub fn derive_rating(recommended: Option<bool>, config: &FilterConfig) -> f32 {
    match recommended {
        Some(true) => config.high_rating,
        Some(false) | None => config.low_rating,
    }
}

/// Attach a derived rating to every record, preserving order.
pub fn rate_all(records: Vec<InteractionRecord>, config: &FilterConfig) -> Vec<FilteredInteraction> {
    records
        .into_par_iter()
        .map(|record| FilteredInteraction {
            rating: derive_rating(record.recommended, config),
            record,
        })
        .collect()
}
