//! Latent-factor engine for the serious-player recommender.
//!
//! This crate provides:
//! - [`Als`], weighted-λ alternating least squares over a sparse rating matrix
//! - [`AlsModel`], the trained factors with cold-start flags and a JSON artifact
//! - [`Recommender`], symmetric top-K lists (items for an actor, actors for an item)
//! - [`evaluate`], RMSE against observed ratings
//! - [`split_holdout`], a seeded train/holdout split
//!
//! ## Example Usage
//! ```ignore
//! use engine::{Als, AlsConfig, Recommender};
//!
//! let model = Als::new(AlsConfig::default().with_seed(42)).fit(&ratings, n_actors, n_items)?;
//! let lists = Recommender::new(&model).recommend_all_items(10);
//! ```

pub mod als;
pub mod error;
pub mod evaluate;
pub mod matrix;
pub mod model;
pub mod recommend;
pub mod solver;
pub mod split;

pub use als::{Als, AlsConfig, Side};
pub use error::{EngineError, Result};
pub use evaluate::{evaluate, Evaluation};
pub use matrix::RatingMatrix;
pub use model::{AlsModel, ColdStartSet};
pub use recommend::{
    ActorsForItem, ItemsForActor, Recommendation, RecommendationList, Recommender,
};
pub use split::split_holdout;
