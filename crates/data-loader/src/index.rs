//! Identifier indexing.
//!
//! Maps high-cardinality raw identifiers onto dense zero-based indices and
//! back. Assignment is frequency ranked: the most frequent raw value gets
//! index 0, ties go to the smaller raw value. Indices are only meaningful
//! against the corpus the indexer was fitted on.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use rayon::prelude::*;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Bidirectional mapping between raw values of type `K` and dense indices `I`.
///
/// One indexer serves exactly one identifier space; use [`ActorIndexer`] and
/// [`ItemIndexer`] rather than naming the generic type directly.
#[derive(Debug, Clone)]
pub struct Indexer<K, I> {
    forward: HashMap<K, I>,
    reverse: Vec<K>,
}

/// Raw reviewer id ↔ actor index
pub type ActorIndexer = Indexer<ActorId, ActorIdx>;

/// Item display name ↔ item index
pub type ItemIndexer = Indexer<String, ItemIdx>;

impl<K, I> Indexer<K, I>
where
    K: Clone + Eq + Hash + Ord + Send + Sync,
    I: DenseIndex,
{
    /// Fit an indexer over a multiset of raw values.
    ///
    /// Counting runs in parallel; the ranking itself is a single sort.
    pub fn fit<'a, T>(values: T) -> Self
    where
        T: IntoParallelIterator<Item = &'a K>,
        K: 'a,
    {
        let counts = values
            .into_par_iter()
            .fold(HashMap::<&K, u64>::new, |mut local, value| {
                *local.entry(value).or_insert(0) += 1;
                local
            })
            .reduce(HashMap::new, |mut acc, local| {
                for (value, count) in local {
                    *acc.entry(value).or_insert(0) += count;
                }
                acc
            });

        let mut ranked: Vec<(&K, u64)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let reverse: Vec<K> = ranked.into_iter().map(|(value, _)| value.clone()).collect();
        debug!("Fitted {} indexer with {} values", I::SPACE, reverse.len());
        Self::from_ordered(reverse)
    }

    /// Rebuild an indexer from values listed in index order, as read back
    /// from a persisted mapping table.
    pub fn from_values(values: Vec<K>) -> Result<Self> {
        let indexer = Self::from_ordered(values);
        if indexer.forward.len() != indexer.reverse.len() {
            // First position whose value already appeared earlier
            let index = indexer
                .reverse
                .iter()
                .enumerate()
                .find(|(i, v)| indexer.forward.get(*v).map(|idx| idx.as_usize()) != Some(*i))
                .map(|(i, _)| i)
                .unwrap_or(0);
            return Err(DataLoadError::DuplicateMapping {
                table: I::SPACE.to_string(),
                index,
            });
        }
        Ok(indexer)
    }

    fn from_ordered(reverse: Vec<K>) -> Self {
        let mut forward = HashMap::with_capacity(reverse.len());
        for (i, value) in reverse.iter().enumerate() {
            forward.entry(value.clone()).or_insert_with(|| I::from_usize(i));
        }
        Self {
            forward,
            reverse,
        }
    }

    /// Raw value → index
    pub fn index_of<Q>(&self, value: &Q) -> Option<I>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get(value).copied()
    }

    /// Index → raw value
    pub fn value_of(&self, index: I) -> Option<&K> {
        self.reverse.get(index.as_usize())
    }

    /// Number of distinct values (the index cardinality)
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Iterate `(index, raw value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (I, &K)> + '_ {
        self.reverse
            .iter()
            .enumerate()
            .map(|(i, value)| (I::from_usize(i), value))
    }
}

impl ItemIndexer {
    /// Rows of the item index-to-name table
    pub fn mapping_rows(&self) -> Vec<ItemMappingRow> {
        self.iter()
            .map(|(idx, name)| ItemMappingRow {
                item_index: idx.0,
                item_name: name.clone(),
            })
            .collect()
    }

    /// Rebuild from the persisted item mapping table (rows in any order)
    pub fn from_mapping_rows(mut rows: Vec<ItemMappingRow>) -> Result<Self> {
        rows.sort_by_key(|row| row.item_index);
        check_contiguous(rows.iter().map(|row| row.item_index), "item")?;
        Self::from_values(rows.into_iter().map(|row| row.item_name).collect())
    }
}

impl ActorIndexer {
    /// Rows of the actor raw-id-to-index table
    pub fn mapping_rows(&self) -> Vec<ActorMappingRow> {
        self.iter()
            .map(|(idx, &actor_id)| ActorMappingRow {
                actor_id,
                actor_index: idx.0,
            })
            .collect()
    }

    /// Rebuild from the persisted actor mapping table (rows in any order)
    pub fn from_mapping_rows(mut rows: Vec<ActorMappingRow>) -> Result<Self> {
        rows.sort_by_key(|row| row.actor_index);
        check_contiguous(rows.iter().map(|row| row.actor_index), "actor")?;
        Self::from_values(rows.into_iter().map(|row| row.actor_id).collect())
    }
}

/// Sorted indices must be exactly 0..n
fn check_contiguous(indices: impl Iterator<Item = u32>, table: &str) -> Result<()> {
    for (expected, index) in indices.enumerate() {
        if index as usize != expected {
            return Err(DataLoadError::InvalidValue {
                field: format!("{table}_index"),
                value: index.to_string(),
            });
        }
    }
    Ok(())
}

/// Both identifier spaces fitted over one filtered corpus, plus the corpus
/// expressed in index space.
#[derive(Debug, Clone)]
pub struct InteractionIndex {
    pub actors: ActorIndexer,
    pub items: ItemIndexer,
    pub ratings: Vec<IndexedRating>,
}

impl InteractionIndex {
    /// Fit both indexers and translate every interaction.
    pub fn fit(interactions: &[FilteredInteraction]) -> Self {
        let (actors, items) = rayon::join(
            || ActorIndexer::fit(interactions.par_iter().map(|i| &i.record.actor_id)),
            || ItemIndexer::fit(interactions.par_iter().map(|i| &i.record.item_name)),
        );

        // Every value was seen during fitting, so lookups cannot miss
        let ratings = interactions
            .par_iter()
            .filter_map(|interaction| {
                Some(IndexedRating {
                    actor: actors.index_of(&interaction.record.actor_id)?,
                    item: items.index_of(&interaction.record.item_name)?,
                    rating: interaction.rating,
                })
            })
            .collect();

        Self {
            actors,
            items,
            ratings,
        }
    }
}
