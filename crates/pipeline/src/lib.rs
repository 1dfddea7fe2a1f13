//! Filtering pipeline from raw reviews to serious-player interactions.
//!
//! This crate provides:
//! - Filter trait and the four predicate filters
//! - FilterPipeline for re-applying fitted filters
//! - InteractionFilter, the ordered six-stage run with its report
//!
//! ## Architecture
//! Raw review rows pass through the stages in a fixed order:
//! 1. Popularity filter drops items with too few reviews
//! 2. IQR filter drops playtime outliers
//! 3. The post-outlier mean playtime is computed
//! 4. Serious-player filter keeps playtime ≥ multiple × mean
//! 5. Actor-id filter drops malformed reviewer ids
//! 6. The recommendation flag becomes a rating
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterConfig, InteractionFilter};
//!
//! let outcome = InteractionFilter::new(FilterConfig::default()).run(records)?;
//! println!("{} serious interactions", outcome.interactions.len());
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod filter_pipeline;
pub mod interaction_filter;
pub mod rating;
pub mod stats;
pub mod traits;

// Re-export main types
pub use config::{FilterConfig, MIN_VALID_ACTOR_ID};
pub use error::{FilterError, Result};
pub use filter_pipeline::FilterPipeline;
pub use interaction_filter::{
    DistributionWarning, FilterOutcome, FilterReport, FilterThresholds, InteractionFilter,
    StageCount,
};
pub use rating::derive_rating;
pub use stats::Quartiles;
pub use traits::Filter;
