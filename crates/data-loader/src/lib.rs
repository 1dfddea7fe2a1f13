//! # Data Loader Crate
//!
//! Loading, indexing and persistence for the serious-player recommender.
//!
//! ## Main Components
//!
//! - **types**: Review records, filtered interactions, dense index newtypes, output table rows
//! - **parser**: Read the cleaned review CSV into [`InteractionRecord`]s
//! - **index**: Frequency-ranked identifier indexing for actors and items
//! - **store**: The [`ArtifactStore`] seam and its directory-backed implementation
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, InteractionIndex};
//! use std::path::Path;
//!
//! let records = parser::read_reviews(Path::new("data/steam_reviews.csv"))?;
//! // ...filter records into FilteredInteractions...
//! let index = InteractionIndex::fit(&filtered);
//! println!("{} actors, {} items", index.actors.len(), index.items.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Raw identifiers
    ActorId,
    ItemId,
    // Dense indices
    ActorIdx,
    DenseIndex,
    ItemIdx,
    // Records
    FilteredInteraction,
    IndexedRating,
    InteractionRecord,
    // Table rows
    ActorMappingRow,
    ItemMappingRow,
    RecommendationRow,
};
pub use index::{ActorIndexer, Indexer, InteractionIndex, ItemIndexer};
pub use store::{ArtifactStore, DirectoryStore};
