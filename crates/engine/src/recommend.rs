//! Top-K recommendation from trained factors.
//!
//! The same model answers both directions: items for an actor (scores
//! `u · Vᵀ`) and actors for an item (scores `v · Uᵀ`). Lists are ordered by
//! score descending with ties on the lower target index first, and never
//! include a cold-start target.

use crate::model::AlsModel;
use data_loader::{ActorIdx, DenseIndex, ItemIdx, RecommendationRow};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, instrument};

/// One scored target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation<T> {
    pub target: T,
    pub score: f32,
}

/// Ranked targets for one source index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationList<S, T> {
    pub source: S,
    pub items: Vec<Recommendation<T>>,
}

impl<S: DenseIndex, T: DenseIndex> RecommendationList<S, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Flatten into table rows, rank starting at 1
    pub fn to_rows(&self) -> Vec<RecommendationRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(rank, rec)| RecommendationRow {
                source_index: self.source.as_usize() as u32,
                rank: rank as u32 + 1,
                target_index: rec.target.as_usize() as u32,
                score: rec.score,
            })
            .collect()
    }
}

pub type ItemsForActor = RecommendationList<ActorIdx, ItemIdx>;
pub type ActorsForItem = RecommendationList<ItemIdx, ActorIdx>;

/// Heap entry; greater means a better recommendation.
#[derive(Debug, Clone, Copy)]
struct Ranked<T> {
    score: f32,
    target: T,
}

impl<T: Ord> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.target.cmp(&self.target))
    }
}

impl<T: Ord> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for Ranked<T> {}

/// Ranks counterpart entities with a trained [`AlsModel`].
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    model: &'a AlsModel,
}

impl<'a> Recommender<'a> {
    pub fn new(model: &'a AlsModel) -> Self {
        Self { model }
    }

    /// Top `k` items for one actor; `None` if the actor is cold start.
    pub fn items_for_actor(&self, actor: ActorIdx, k: usize) -> Option<ItemsForActor> {
        let source = self.model.actor_vector(actor)?;
        let items = top_k(source, self.model.item_factors(), k, |item: ItemIdx| {
            self.model.is_item_trained(item)
        });
        Some(RecommendationList { source: actor, items })
    }

    /// Top `k` actors for one item; `None` if the item is cold start.
    pub fn actors_for_item(&self, item: ItemIdx, k: usize) -> Option<ActorsForItem> {
        let source = self.model.item_vector(item)?;
        let items = top_k(source, self.model.actor_factors(), k, |actor: ActorIdx| {
            self.model.is_actor_trained(actor)
        });
        Some(RecommendationList { source: item, items })
    }

    /// One list per trained actor, in actor index order
    #[instrument(skip(self))]
    pub fn recommend_all_actors(&self, k: usize) -> Vec<ItemsForActor> {
        let lists: Vec<ItemsForActor> = (0..self.model.n_actors())
            .into_par_iter()
            .filter_map(|a| self.items_for_actor(ActorIdx::from_usize(a), k))
            .collect();
        debug!("Generated {} item lists for actors", lists.len());
        lists
    }

    /// One list per trained item, in item index order
    #[instrument(skip(self))]
    pub fn recommend_all_items(&self, k: usize) -> Vec<ActorsForItem> {
        let lists: Vec<ActorsForItem> = (0..self.model.n_items())
            .into_par_iter()
            .filter_map(|i| self.actors_for_item(ItemIdx::from_usize(i), k))
            .collect();
        debug!("Generated {} actor lists for items", lists.len());
        lists
    }
}

/// Keep the `k` best-scoring eligible targets with a bounded min-heap.
fn top_k<T: DenseIndex>(
    source: ArrayView1<'_, f32>,
    targets: &Array2<f32>,
    k: usize,
    eligible: impl Fn(T) -> bool,
) -> Vec<Recommendation<T>> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked<T>>> = BinaryHeap::with_capacity(k + 1);
    for (j, row) in targets.outer_iter().enumerate() {
        let target = T::from_usize(j);
        if !eligible(target) {
            continue;
        }
        let score = source.dot(&row);
        if score.is_nan() {
            continue;
        }

        let candidate = Ranked { score, target };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if heap.peek().is_some_and(|Reverse(worst)| candidate > *worst) {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    // Ascending order of Reverse is best-first
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(r)| Recommendation {
            target: r.target,
            score: r.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::als::AlsConfig;
    use ndarray::array;

    /// Items 1 and 2 tie for actor 0; item 3 is cold; actor 2 is cold
    fn model() -> AlsModel {
        AlsModel::from_parts(
            AlsConfig::default().with_rank(2),
            array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
            array![[1.0, 0.0], [2.0, 1.0], [2.0, 5.0], [0.0, 0.0]],
            vec![true, true, false],
            vec![true, true, true, false],
        )
        .unwrap()
    }

    #[test]
    fn test_items_for_actor_ordering() {
        let model = model();
        let list = Recommender::new(&model).items_for_actor(ActorIdx(0), 10).unwrap();

        let targets: Vec<ItemIdx> = list.items.iter().map(|r| r.target).collect();
        // 2.0 tie between items 1 and 2 breaks on the lower index
        assert_eq!(targets, vec![ItemIdx(1), ItemIdx(2), ItemIdx(0)]);
        assert_eq!(list.items[0].score, 2.0);
        assert_eq!(list.items[2].score, 1.0);
    }

    #[test]
    fn test_truncates_to_k() {
        let model = model();
        let list = Recommender::new(&model).items_for_actor(ActorIdx(1), 1).unwrap();
        assert_eq!(list.items, vec![Recommendation { target: ItemIdx(2), score: 5.0 }]);
    }

    #[test]
    fn test_zero_k_is_empty() {
        let model = model();
        let list = Recommender::new(&model).items_for_actor(ActorIdx(0), 0).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_cold_source_and_targets() {
        let model = model();
        let recommender = Recommender::new(&model);

        assert!(recommender.items_for_actor(ActorIdx(2), 5).is_none());
        assert!(recommender.actors_for_item(ItemIdx(3), 5).is_none());

        let list = recommender.actors_for_item(ItemIdx(2), 5).unwrap();
        assert!(list.items.iter().all(|r| r.target != ActorIdx(2)));
        // Not padded up to k
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_recommend_all_skips_cold_sources() {
        let model = model();
        let recommender = Recommender::new(&model);

        let by_actor = recommender.recommend_all_actors(2);
        let sources: Vec<ActorIdx> = by_actor.iter().map(|l| l.source).collect();
        assert_eq!(sources, vec![ActorIdx(0), ActorIdx(1)]);

        let by_item = recommender.recommend_all_items(2);
        assert_eq!(by_item.len(), 3);
    }

    #[test]
    fn test_to_rows_ranks_from_one() {
        let model = model();
        let rows = Recommender::new(&model)
            .actors_for_item(ItemIdx(2), 5)
            .unwrap()
            .to_rows();

        assert_eq!(
            rows,
            vec![
                RecommendationRow { source_index: 2, rank: 1, target_index: 1, score: 5.0 },
                RecommendationRow { source_index: 2, rank: 2, target_index: 0, score: 2.0 },
            ]
        );
    }
}
