//! Alternating least squares.
//!
//! Learns actor factors `U` (n_actors × rank) and item factors `V`
//! (n_items × rank) so that `U Vᵀ` reproduces the observed ratings. Each
//! iteration holds `V` fixed and solves every actor row, then holds `U` fixed
//! and solves every item row. A row solve is the regularized normal equation
//!
//! ```text
//! (Yᵀ Y + λ·n·I) x = Yᵀ r
//! ```
//!
//! where `Y` stacks the fixed-side rows the entity has ratings against, `r`
//! holds those ratings and `n` is their count. Rows within a half-step do not
//! depend on each other and are solved in parallel.

use crate::error::{EngineError, Result};
use crate::matrix::RatingMatrix;
use crate::model::AlsModel;
use crate::solver::cholesky_solve;
use data_loader::IndexedRating;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Which factor matrix a half-step solves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Actor,
    Item,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Actor => write!(f, "actor"),
            Side::Item => write!(f, "item"),
        }
    }
}

/// ALS hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlsConfig {
    /// Length of every factor row
    pub rank: usize,
    pub iterations: usize,
    /// λ, scaled per row by its observation count
    pub regularization: f64,
    /// Seed for factor initialisation; unseeded runs are not reproducible
    pub seed: Option<u64>,
}

impl Default for AlsConfig {
    fn default() -> Self {
        Self {
            rank: 10,
            iterations: 10,
            regularization: 0.01,
            seed: None,
        }
    }
}

impl AlsConfig {
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rank == 0 {
            return Err(EngineError::InvalidConfig("rank must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(EngineError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}

/// ALS trainer
#[derive(Debug, Clone, Default)]
pub struct Als {
    config: AlsConfig,
}

impl Als {
    pub fn new(config: AlsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlsConfig {
        &self.config
    }

    /// Train on indexed ratings over index spaces of the given cardinalities.
    ///
    /// Indices with no rating are cold start: their factor rows stay zero and
    /// the model refuses to score them.
    ///
    /// # Errors
    /// - [`EngineError::InvalidConfig`] for bad hyperparameters
    /// - [`EngineError::InsufficientData`] when there is nothing to train on
    /// - [`EngineError::IndexOutOfRange`] for a rating outside the spaces
    /// - [`EngineError::SingularSystem`] when a row solve is not positive definite
    #[instrument(skip(self, ratings), fields(ratings = ratings.len(), rank = self.config.rank))]
    pub fn fit(&self, ratings: &[IndexedRating], n_actors: usize, n_items: usize) -> Result<AlsModel> {
        self.config.validate()?;
        if ratings.is_empty() || n_actors == 0 || n_items == 0 {
            return Err(EngineError::InsufficientData(format!(
                "{} ratings over {} actors and {} items",
                ratings.len(),
                n_actors,
                n_items
            )));
        }

        let matrix = RatingMatrix::from_ratings(ratings, n_actors, n_items)?;
        let rank = self.config.rank;
        let lambda = self.config.regularization;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut actor_factors = random_factors(n_actors, rank, &mut rng);
        let mut item_factors = random_factors(n_items, rank, &mut rng);

        for iteration in 0..self.config.iterations {
            actor_factors = solve_half_step(&item_factors, matrix.by_actor(), rank, lambda, Side::Actor)?;
            item_factors = solve_half_step(&actor_factors, matrix.by_item(), rank, lambda, Side::Item)?;

            debug!(
                "ALS iteration {}: training mse = {:.6}",
                iteration + 1,
                training_mse(&matrix, &actor_factors, &item_factors)
            );
        }

        let actor_trained: Vec<bool> = matrix.by_actor().iter().map(|row| !row.is_empty()).collect();
        let item_trained: Vec<bool> = matrix.by_item().iter().map(|row| !row.is_empty()).collect();

        let model = AlsModel::from_parts(
            self.config.clone(),
            actor_factors,
            item_factors,
            actor_trained,
            item_trained,
        )?;

        let cold = model.cold_start();
        if !cold.is_empty() {
            warn!(
                "Excluded {} actors and {} items with no training ratings",
                cold.actors.len(),
                cold.items.len()
            );
        }
        info!(
            actors = n_actors,
            items = n_items,
            observed = matrix.nnz(),
            "ALS training complete"
        );
        Ok(model)
    }
}

/// Uniform [0, 1) entries scaled by 1/√rank
fn random_factors(rows: usize, rank: usize, rng: &mut StdRng) -> Array2<f32> {
    let scale = 1.0 / (rank as f32).sqrt();
    Array2::from_shape_fn((rows, rank), |_| rng.random::<f32>() * scale)
}

/// Solve every row of one side against the fixed other side.
///
/// Rows without observations come back as zeros.
fn solve_half_step(
    fixed: &Array2<f32>,
    rows: &[Vec<(u32, f32)>],
    rank: usize,
    lambda: f64,
    side: Side,
) -> Result<Array2<f32>> {
    let solved: Vec<Option<Array1<f32>>> = rows
        .par_iter()
        .enumerate()
        .map(|(row, observed)| {
            if observed.is_empty() {
                return Ok(None);
            }
            solve_row(fixed, observed, rank, lambda)
                .map(Some)
                .ok_or(EngineError::SingularSystem { side, row })
        })
        .collect::<Result<_>>()?;

    let mut factors = Array2::<f32>::zeros((rows.len(), rank));
    for (row, x) in solved.into_iter().enumerate() {
        if let Some(x) = x {
            factors.row_mut(row).assign(&x);
        }
    }
    Ok(factors)
}

/// Build and solve `(Yᵀ Y + λ·n·I) x = Yᵀ r` for one row
fn solve_row(
    fixed: &Array2<f32>,
    observed: &[(u32, f32)],
    rank: usize,
    lambda: f64,
) -> Option<Array1<f32>> {
    let mut a = Array2::<f64>::zeros((rank, rank));
    let mut b = Array1::<f64>::zeros(rank);

    for &(j, rating) in observed {
        let y = fixed.row(j as usize);
        for p in 0..rank {
            let yp = y[p] as f64;
            b[p] += rating as f64 * yp;
            for q in 0..=p {
                a[[p, q]] += yp * y[q] as f64;
            }
        }
    }

    let reg = lambda * observed.len() as f64;
    for p in 0..rank {
        a[[p, p]] += reg;
        for q in 0..p {
            a[[q, p]] = a[[p, q]];
        }
    }

    cholesky_solve(&a, &b).map(|x| x.mapv(|v| v as f32))
}

/// Mean squared error over the observed cells
fn training_mse(matrix: &RatingMatrix, actors: &Array2<f32>, items: &Array2<f32>) -> f64 {
    let (sum, count) = matrix
        .by_actor()
        .par_iter()
        .enumerate()
        .map(|(a, row)| {
            let u = actors.row(a);
            row.iter().fold((0.0_f64, 0_usize), |(sum, count), &(i, rating)| {
                let err = (u.dot(&items.row(i as usize)) - rating) as f64;
                (sum + err * err, count + 1)
            })
        })
        .reduce(|| (0.0, 0), |x, y| (x.0 + y.0, x.1 + y.1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{ActorIdx, ItemIdx};

    fn rating(actor: u32, item: u32, rating: f32) -> IndexedRating {
        IndexedRating {
            actor: ActorIdx(actor),
            item: ItemIdx(item),
            rating,
        }
    }

    /// Two taste groups: actors 0-2 love items 0-1, actors 3-5 love items 2-3
    fn two_block_ratings() -> Vec<IndexedRating> {
        let mut ratings = Vec::new();
        for a in 0..6 {
            for i in 0..4 {
                let likes = (a < 3) == (i < 2);
                ratings.push(rating(a, i, if likes { 5.0 } else { 1.0 }));
            }
        }
        ratings
    }

    #[test]
    fn test_config_validation() {
        assert!(AlsConfig::default().validate().is_ok());
        assert!(AlsConfig::default().with_rank(0).validate().is_err());
        assert!(AlsConfig::default().with_iterations(0).validate().is_err());
        assert!(AlsConfig::default().with_regularization(-1.0).validate().is_err());
        assert!(AlsConfig::default().with_regularization(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_fit_shapes() {
        let config = AlsConfig::default().with_rank(3).with_iterations(2).with_seed(7);
        let model = Als::new(config).fit(&two_block_ratings(), 6, 4).unwrap();

        assert_eq!(model.actor_factors().dim(), (6, 3));
        assert_eq!(model.item_factors().dim(), (4, 3));
        assert!(model.cold_start().is_empty());
    }

    #[test]
    fn test_fit_reconstructs_block_structure() {
        let config = AlsConfig::default()
            .with_rank(2)
            .with_iterations(20)
            .with_seed(42);
        let model = Als::new(config).fit(&two_block_ratings(), 6, 4).unwrap();

        let liked = model.predict(ActorIdx(0), ItemIdx(0)).unwrap();
        let disliked = model.predict(ActorIdx(0), ItemIdx(3)).unwrap();
        assert!(liked > disliked + 2.0, "liked {liked}, disliked {disliked}");

        let liked = model.predict(ActorIdx(4), ItemIdx(2)).unwrap();
        let disliked = model.predict(ActorIdx(4), ItemIdx(1)).unwrap();
        assert!(liked > disliked + 2.0, "liked {liked}, disliked {disliked}");
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let config = AlsConfig::default().with_rank(4).with_iterations(3).with_seed(99);
        let a = Als::new(config.clone()).fit(&two_block_ratings(), 6, 4).unwrap();
        let b = Als::new(config).fit(&two_block_ratings(), 6, 4).unwrap();

        assert_eq!(a.actor_factors(), b.actor_factors());
        assert_eq!(a.item_factors(), b.item_factors());
    }

    #[test]
    fn test_cold_start_rows_excluded() {
        // Actor 2 and item 3 have no ratings
        let ratings = vec![rating(0, 0, 5.0), rating(0, 1, 1.0), rating(1, 2, 5.0), rating(1, 0, 5.0)];
        let config = AlsConfig::default().with_rank(2).with_iterations(3).with_seed(1);
        let model = Als::new(config).fit(&ratings, 3, 4).unwrap();

        let cold = model.cold_start();
        assert_eq!(cold.actors, vec![ActorIdx(2)]);
        assert_eq!(cold.items, vec![ItemIdx(3)]);
        assert!(model.actor_factors().row(2).iter().all(|&v| v == 0.0));
        assert_eq!(model.predict(ActorIdx(2), ItemIdx(0)), None);
        assert_eq!(model.predict(ActorIdx(0), ItemIdx(3)), None);
        assert!(model.predict(ActorIdx(0), ItemIdx(0)).is_some());
    }

    #[test]
    fn test_singular_without_regularization() {
        // One rating cannot pin down a rank-2 row when λ = 0
        let config = AlsConfig::default()
            .with_rank(2)
            .with_regularization(0.0)
            .with_seed(3);
        let err = Als::new(config).fit(&[rating(0, 0, 5.0)], 1, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::SingularSystem { side: Side::Actor, row: 0 }
        ));
    }

    #[test]
    fn test_regularization_keeps_single_rating_solvable() {
        let config = AlsConfig::default().with_rank(5).with_seed(3);
        assert!(Als::new(config).fit(&[rating(0, 0, 5.0)], 1, 1).is_ok());
    }

    #[test]
    fn test_insufficient_data() {
        let err = Als::new(AlsConfig::default()).fit(&[], 0, 0).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));
    }
}
