//! Sparse observed-rating matrix with per-actor and per-item views.

use crate::error::{EngineError, Result};
use data_loader::{ActorIdx, DenseIndex, IndexedRating, ItemIdx};
use std::collections::HashMap;

/// Observed ratings, stored twice: grouped by actor and grouped by item.
///
/// Each ALS half-step walks one of the two views.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    n_actors: usize,
    n_items: usize,
    /// `by_actor[a]` = `(item, rating)` pairs, sorted by item
    by_actor: Vec<Vec<(u32, f32)>>,
    /// `by_item[i]` = `(actor, rating)` pairs, sorted by actor
    by_item: Vec<Vec<(u32, f32)>>,
    nnz: usize,
}

impl RatingMatrix {
    /// Build both views. A repeated (actor, item) pair keeps its last rating.
    pub fn from_ratings(ratings: &[IndexedRating], n_actors: usize, n_items: usize) -> Result<Self> {
        let mut cells: HashMap<(u32, u32), f32> = HashMap::with_capacity(ratings.len());
        for r in ratings {
            check_range(r.actor, n_actors)?;
            check_range(r.item, n_items)?;
            cells.insert((r.actor.0, r.item.0), r.rating);
        }

        let mut by_actor = vec![Vec::new(); n_actors];
        let mut by_item = vec![Vec::new(); n_items];
        for (&(actor, item), &rating) in &cells {
            by_actor[actor as usize].push((item, rating));
            by_item[item as usize].push((actor, rating));
        }
        for row in by_actor.iter_mut().chain(by_item.iter_mut()) {
            row.sort_unstable_by_key(|&(j, _)| j);
        }

        Ok(Self {
            n_actors,
            n_items,
            by_actor,
            by_item,
            nnz: cells.len(),
        })
    }

    pub fn n_actors(&self) -> usize {
        self.n_actors
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of distinct observed cells
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    pub fn by_actor(&self) -> &[Vec<(u32, f32)>] {
        &self.by_actor
    }

    pub fn by_item(&self) -> &[Vec<(u32, f32)>] {
        &self.by_item
    }

    /// Ratings observed for one actor, as `(item, rating)`
    pub fn actor_row(&self, actor: ActorIdx) -> &[(u32, f32)] {
        self.by_actor.get(actor.as_usize()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ratings observed for one item, as `(actor, rating)`
    pub fn item_row(&self, item: ItemIdx) -> &[(u32, f32)] {
        self.by_item.get(item.as_usize()).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn check_range<I: DenseIndex>(index: I, len: usize) -> Result<()> {
    if index.as_usize() >= len {
        return Err(EngineError::IndexOutOfRange {
            space: I::SPACE,
            index: index.as_usize(),
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(actor: u32, item: u32, rating: f32) -> IndexedRating {
        IndexedRating {
            actor: ActorIdx(actor),
            item: ItemIdx(item),
            rating,
        }
    }

    #[test]
    fn test_views_agree() {
        let matrix = RatingMatrix::from_ratings(
            &[rating(0, 1, 5.0), rating(1, 0, 1.0), rating(0, 0, 1.0)],
            3,
            2,
        )
        .unwrap();

        assert_eq!(matrix.nnz(), 3);
        assert_eq!(matrix.actor_row(ActorIdx(0)), &[(0, 1.0), (1, 5.0)]);
        assert_eq!(matrix.item_row(ItemIdx(0)), &[(0, 1.0), (1, 1.0)]);
        assert!(matrix.actor_row(ActorIdx(2)).is_empty());
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let matrix =
            RatingMatrix::from_ratings(&[rating(0, 0, 1.0), rating(0, 0, 5.0)], 1, 1).unwrap();
        assert_eq!(matrix.nnz(), 1);
        assert_eq!(matrix.actor_row(ActorIdx(0)), &[(0, 5.0)]);
    }

    #[test]
    fn test_out_of_range() {
        let err = RatingMatrix::from_ratings(&[rating(0, 3, 1.0)], 1, 2).unwrap_err();
        assert!(matches!(
            err,
            EngineError::IndexOutOfRange { space: "item", index: 3, len: 2 }
        ));
    }
}
