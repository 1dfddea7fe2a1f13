//! Random train/holdout split of indexed ratings.

use crate::error::{EngineError, Result};
use data_loader::IndexedRating;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Split `ratings` into `(train, holdout)`, sending each rating to the
/// holdout with probability `fraction`.
///
/// Relative order is preserved within both halves. A fraction of zero keeps
/// everything in training. Holdout ratings whose actor or item never lands
/// in training become cold start and are skipped by [`crate::evaluate`].
pub fn split_holdout(
    ratings: &[IndexedRating],
    fraction: f64,
    seed: Option<u64>,
) -> Result<(Vec<IndexedRating>, Vec<IndexedRating>)> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(EngineError::InvalidConfig(format!(
            "holdout fraction must be in [0, 1), got {fraction}"
        )));
    }
    if fraction == 0.0 {
        return Ok((ratings.to_vec(), Vec::new()));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let (holdout, train): (Vec<IndexedRating>, Vec<IndexedRating>) = ratings
        .iter()
        .partition(|_| rng.random_bool(fraction));

    debug!(train = train.len(), holdout = holdout.len(), "Split ratings");
    Ok((train, holdout))
}
