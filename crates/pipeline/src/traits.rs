//! Core trait for the filtering pipeline.

use data_loader::InteractionRecord;
use rayon::prelude::*;

/// A row-level predicate over interaction records.
///
/// Filters that depend on corpus statistics are fitted first and then applied
/// as plain predicates, so the same fitted filter can be re-applied to any set
/// of records.
///
/// ## Design Note
/// - `Send + Sync` lets `apply` evaluate the predicate on worker threads
/// - Filters take ownership of the records and return the survivors in their
///   original order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `record` survives this filter
    fn keeps(&self, record: &InteractionRecord) -> bool;

    /// Apply this filter to a set of records.
    fn apply(&self, records: Vec<InteractionRecord>) -> Vec<InteractionRecord> {
        records
            .into_par_iter()
            .filter(|record| self.keeps(record))
            .collect()
    }
}
