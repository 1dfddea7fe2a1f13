//! Filter implementations for the interaction pipeline.
//!
//! Each filter is a plain predicate once fitted; the stage order lives in
//! [`InteractionFilter`](crate::InteractionFilter).

pub mod actor_id;
pub mod playtime_range;
pub mod popularity;
pub mod serious_player;

// Re-export for convenience
pub use actor_id::ActorIdFilter;
pub use playtime_range::PlaytimeRangeFilter;
pub use popularity::PopularityFilter;
pub use serious_player::SeriousPlayerFilter;
