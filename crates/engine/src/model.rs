//! Trained factor model and its JSON artifact.

use crate::als::AlsConfig;
use crate::error::{EngineError, Result};
use data_loader::{ActorIdx, DenseIndex, ItemIdx};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Indices that had no training ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColdStartSet {
    pub actors: Vec<ActorIdx>,
    pub items: Vec<ItemIdx>,
}

impl ColdStartSet {
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.items.is_empty()
    }
}

/// Actor and item latent factors learned by [`crate::Als`].
///
/// A predicted rating is the dot product of an actor row and an item row.
/// Rows for indices without training data are zero and flagged untrained;
/// the model returns no score for them instead of a meaningless zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelArtifact")]
pub struct AlsModel {
    config: AlsConfig,
    actor_factors: Array2<f32>,
    item_factors: Array2<f32>,
    actor_trained: Vec<bool>,
    item_trained: Vec<bool>,
}

/// Unvalidated wire form of [`AlsModel`]
#[derive(Deserialize)]
struct ModelArtifact {
    config: AlsConfig,
    actor_factors: Array2<f32>,
    item_factors: Array2<f32>,
    actor_trained: Vec<bool>,
    item_trained: Vec<bool>,
}

impl TryFrom<ModelArtifact> for AlsModel {
    type Error = EngineError;

    fn try_from(artifact: ModelArtifact) -> Result<Self> {
        AlsModel::from_parts(
            artifact.config,
            artifact.actor_factors,
            artifact.item_factors,
            artifact.actor_trained,
            artifact.item_trained,
        )
    }
}

impl AlsModel {
    /// Assemble a model, checking that every shape agrees.
    pub fn from_parts(
        config: AlsConfig,
        actor_factors: Array2<f32>,
        item_factors: Array2<f32>,
        actor_trained: Vec<bool>,
        item_trained: Vec<bool>,
    ) -> Result<Self> {
        let rank = config.rank;
        if actor_factors.ncols() != rank || item_factors.ncols() != rank {
            return Err(EngineError::CorruptModel(format!(
                "factor widths {} and {} do not match rank {}",
                actor_factors.ncols(),
                item_factors.ncols(),
                rank
            )));
        }
        if actor_trained.len() != actor_factors.nrows() {
            return Err(EngineError::CorruptModel(format!(
                "{} actor flags for {} actor rows",
                actor_trained.len(),
                actor_factors.nrows()
            )));
        }
        if item_trained.len() != item_factors.nrows() {
            return Err(EngineError::CorruptModel(format!(
                "{} item flags for {} item rows",
                item_trained.len(),
                item_factors.nrows()
            )));
        }
        if actor_factors.iter().chain(item_factors.iter()).any(|v| !v.is_finite()) {
            return Err(EngineError::CorruptModel("non-finite factor value".into()));
        }

        Ok(Self {
            config,
            actor_factors,
            item_factors,
            actor_trained,
            item_trained,
        })
    }

    pub fn config(&self) -> &AlsConfig {
        &self.config
    }

    pub fn rank(&self) -> usize {
        self.config.rank
    }

    pub fn n_actors(&self) -> usize {
        self.actor_factors.nrows()
    }

    pub fn n_items(&self) -> usize {
        self.item_factors.nrows()
    }

    /// Actor factor matrix, one row per actor index
    pub fn actor_factors(&self) -> &Array2<f32> {
        &self.actor_factors
    }

    /// Item factor matrix, one row per item index
    pub fn item_factors(&self) -> &Array2<f32> {
        &self.item_factors
    }

    pub fn is_actor_trained(&self, actor: ActorIdx) -> bool {
        self.actor_trained.get(actor.as_usize()).copied().unwrap_or(false)
    }

    pub fn is_item_trained(&self, item: ItemIdx) -> bool {
        self.item_trained.get(item.as_usize()).copied().unwrap_or(false)
    }

    /// Factor row of a trained actor
    pub fn actor_vector(&self, actor: ActorIdx) -> Option<ArrayView1<'_, f32>> {
        self.is_actor_trained(actor)
            .then(|| self.actor_factors.row(actor.as_usize()))
    }

    /// Factor row of a trained item
    pub fn item_vector(&self, item: ItemIdx) -> Option<ArrayView1<'_, f32>> {
        self.is_item_trained(item)
            .then(|| self.item_factors.row(item.as_usize()))
    }

    /// Predicted rating, or `None` if either side is cold start or out of range.
    pub fn predict(&self, actor: ActorIdx, item: ItemIdx) -> Option<f32> {
        let u = self.actor_vector(actor)?;
        let v = self.item_vector(item)?;
        Some(u.dot(&v))
    }

    pub fn cold_start(&self) -> ColdStartSet {
        ColdStartSet {
            actors: untrained(&self.actor_trained),
            items: untrained(&self.item_trained),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a model written by [`AlsModel::to_json_bytes`].
    ///
    /// Shape mismatches surface as [`EngineError::Serialization`] carrying the
    /// validation message.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn untrained<I: DenseIndex>(flags: &[bool]) -> Vec<I> {
    flags
        .iter()
        .enumerate()
        .filter(|&(_, &trained)| !trained)
        .map(|(i, _)| I::from_usize(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn hand_built() -> AlsModel {
        AlsModel::from_parts(
            AlsConfig::default().with_rank(2),
            array![[1.0, 0.0], [0.0, 2.0], [0.0, 0.0]],
            array![[3.0, 1.0], [0.5, 0.5]],
            vec![true, true, false],
            vec![true, true],
        )
        .unwrap()
    }

    #[test]
    fn test_predict_is_dot_product() {
        let model = hand_built();
        assert_eq!(model.predict(ActorIdx(0), ItemIdx(0)), Some(3.0));
        assert_eq!(model.predict(ActorIdx(1), ItemIdx(1)), Some(1.0));
    }

    #[test]
    fn test_predict_refuses_cold_and_unknown() {
        let model = hand_built();
        assert_eq!(model.predict(ActorIdx(2), ItemIdx(0)), None);
        assert_eq!(model.predict(ActorIdx(9), ItemIdx(0)), None);
        assert_eq!(model.predict(ActorIdx(0), ItemIdx(9)), None);
        assert_eq!(
            model.cold_start(),
            ColdStartSet {
                actors: vec![ActorIdx(2)],
                items: vec![],
            }
        );
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = AlsModel::from_parts(
            AlsConfig::default().with_rank(3),
            array![[1.0, 0.0]],
            array![[1.0, 0.0]],
            vec![true],
            vec![true],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CorruptModel(_)));

        let err = AlsModel::from_parts(
            AlsConfig::default().with_rank(2),
            array![[1.0, 0.0]],
            array![[1.0, 0.0]],
            vec![true, false],
            vec![true],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CorruptModel(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let model = hand_built();
        let bytes = model.to_json_bytes().unwrap();
        let decoded = AlsModel::from_json_bytes(&bytes).unwrap();
        assert_eq!(decoded, model);
    }

    #[test]
    fn test_corrupt_json_rejected() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&hand_built().to_json_bytes().unwrap()).unwrap();
        value["actor_trained"] = serde_json::json!([true]);
        let bytes = serde_json::to_vec(&value).unwrap();

        assert!(AlsModel::from_json_bytes(&bytes).is_err());
        assert!(AlsModel::from_json_bytes(b"not json").is_err());
    }
}
