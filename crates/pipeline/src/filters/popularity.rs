//! Drop items that too few players reviewed.
//!
//! Low-count "items" in the dump are mostly free-text garbage that ended up in
//! the name column, not genuine niche titles, so a hard review-count floor
//! removes them.

use crate::traits::Filter;
use data_loader::InteractionRecord;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Keeps records whose item (grouped by display name) has at least
/// `min_reviews` records in the corpus the filter was fitted on.
#[derive(Debug, Clone)]
pub struct PopularityFilter {
    popular: HashSet<String>,
    min_reviews: usize,
}

impl PopularityFilter {
    /// Count records per item name and remember the ones at or above the bar.
    pub fn fit(records: &[InteractionRecord], min_reviews: usize) -> Self {
        let counts = records
            .par_iter()
            .fold(HashMap::<&str, usize>::new, |mut local, record| {
                *local.entry(record.item_name.as_str()).or_insert(0) += 1;
                local
            })
            .reduce(HashMap::new, |mut acc, local| {
                for (name, count) in local {
                    *acc.entry(name).or_insert(0) += count;
                }
                acc
            });

        let popular = counts
            .into_iter()
            .filter(|&(_, count)| count >= min_reviews)
            .map(|(name, _)| name.to_string())
            .collect();

        Self {
            popular,
            min_reviews,
        }
    }

    /// Number of items that cleared the bar
    pub fn popular_items(&self) -> usize {
        self.popular.len()
    }

    pub fn min_reviews(&self) -> usize {
        self.min_reviews
    }
}

impl Filter for PopularityFilter {
    fn name(&self) -> &str {
        "PopularityFilter"
    }

    fn keeps(&self, record: &InteractionRecord) -> bool {
        self.popular.contains(&record.item_name)
    }
}
