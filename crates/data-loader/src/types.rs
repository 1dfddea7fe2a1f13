//! Core domain types for the review dataset.
//!
//! Raw identifiers keep the representation the review platform uses
//! (`ActorId`, `ItemId`). Dense indices handed to the factorization engine are
//! separate newtypes so an actor index can never be used against the item
//! space by accident.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// =============================================================================
// Raw identifiers
// =============================================================================

/// Platform-issued account id of a reviewer (e.g. 76561198000000001)
pub type ActorId = u64;

/// Numeric id of a game on the review platform
pub type ItemId = u32;

// =============================================================================
// Dense indices
// =============================================================================

/// A zero-based position in one identifier space.
///
/// Implemented by [`ActorIdx`] and [`ItemIdx`]; generic code over the two
/// spaces (the indexer, the recommender) is written against this trait.
pub trait DenseIndex: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Name of the identifier space, used in logs and error messages
    const SPACE: &'static str;

    fn from_usize(index: usize) -> Self;

    fn as_usize(self) -> usize;
}

/// Dense index into the actor (reviewer) space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorIdx(pub u32);

/// Dense index into the item (game) space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemIdx(pub u32);

impl DenseIndex for ActorIdx {
    const SPACE: &'static str = "actor";

    fn from_usize(index: usize) -> Self {
        ActorIdx(index as u32)
    }

    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl DenseIndex for ItemIdx {
    const SPACE: &'static str = "item";

    fn from_usize(index: usize) -> Self {
        ItemIdx(index as u32)
    }

    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl fmt::Display for ItemIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

// =============================================================================
// Interaction records
// =============================================================================

/// One review row: a single (actor, item) pair with its engagement signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub item_id: ItemId,
    /// Display name; popularity is grouped on this field, not on `item_id`
    pub item_name: String,
    pub review_id: u64,
    pub language: String,
    pub actor_id: ActorId,
    /// Unix timestamp of the review
    pub timestamp: i64,
    /// Total playtime the actor had on the item when reviewing
    pub playtime: f64,
    /// `None` when the source row left the flag empty
    pub recommended: Option<bool>,
}

/// A record that survived every filtering stage, with its derived rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredInteraction {
    pub record: InteractionRecord,
    pub rating: f32,
}

/// An interaction expressed in dense index space, ready for training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedRating {
    pub actor: ActorIdx,
    pub item: ItemIdx,
    pub rating: f32,
}

// =============================================================================
// Output table rows
// =============================================================================

/// One row of the item index-to-name table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMappingRow {
    pub item_index: u32,
    pub item_name: String,
}

/// One row of the actor raw-id-to-index table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorMappingRow {
    pub actor_id: ActorId,
    pub actor_index: u32,
}

/// One entry of a recommendation list, flattened into table form.
///
/// `rank` is 1-based; rows sharing a `source_index` ordered by `rank`
/// reproduce the ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub source_index: u32,
    pub rank: u32,
    pub target_index: u32,
    pub score: f32,
}
