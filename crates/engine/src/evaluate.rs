//! Reconstruction error of a trained model.

use crate::model::AlsModel;
use data_loader::IndexedRating;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// RMSE over the ratings the model can score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// `None` when every rating touched a cold-start index
    pub rmse: Option<f64>,
    /// Ratings that contributed to the error
    pub evaluated: usize,
    /// Ratings skipped because the actor or item is cold start
    pub skipped_cold_start: usize,
}

/// Compare predicted and observed ratings.
///
/// Ratings the model refuses to score are skipped, the same rule the
/// recommender applies to cold-start indices.
#[instrument(skip(model, ratings), fields(ratings = ratings.len()))]
pub fn evaluate(model: &AlsModel, ratings: &[IndexedRating]) -> Evaluation {
    let (sum_sq, evaluated) = ratings
        .par_iter()
        .filter_map(|r| {
            model
                .predict(r.actor, r.item)
                .map(|p| (p as f64 - r.rating as f64).powi(2))
        })
        .fold(|| (0.0_f64, 0_usize), |(sum, n), err| (sum + err, n + 1))
        .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    let skipped_cold_start = ratings.len() - evaluated;
    if skipped_cold_start > 0 {
        warn!("Skipped {} ratings touching cold-start indices", skipped_cold_start);
    }

    let rmse = (evaluated > 0).then(|| (sum_sq / evaluated as f64).sqrt());
    info!(?rmse, evaluated, skipped_cold_start, "Evaluation complete");

    Evaluation {
        rmse,
        evaluated,
        skipped_cold_start,
    }
}
