//! The FilterPipeline chains fitted filters.
//!
//! Used to re-apply a set of already-fitted stages in order, e.g. the
//! thresholds recorded by an [`InteractionFilter`](crate::InteractionFilter)
//! run.

use crate::traits::Filter;
use data_loader::InteractionRecord;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(PlaytimeRangeFilter::new(-17.0, 28.0))
///     .add_filter(ActorIdFilter::new(MIN_VALID_ACTOR_ID));
///
/// let filtered = pipeline.apply(records);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence, logging counts around each one.
    pub fn apply(&self, records: Vec<InteractionRecord>) -> Vec<InteractionRecord> {
        let mut current = records;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }

    /// Whether `record` passes every filter
    pub fn retains(&self, record: &InteractionRecord) -> bool {
        self.filters.iter().all(|f| f.keeps(record))
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
