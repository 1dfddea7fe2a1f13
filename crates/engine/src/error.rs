//! Error types for training, scoring and model (de)serialization.

use crate::als::Side;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A hyperparameter is out of range
    #[error("Invalid ALS configuration: {0}")]
    InvalidConfig(String),

    /// Nothing to train on
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A per-row normal-equation system was not positive definite
    #[error("Singular least-squares system for {side} row {row}")]
    SingularSystem { side: Side, row: usize },

    /// An index does not fit the declared cardinality
    #[error("{space} index {index} out of range (cardinality {len})")]
    IndexOutOfRange {
        space: &'static str,
        index: usize,
        len: usize,
    },

    /// Model artifact could not be encoded or decoded
    #[error("Model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A decoded model has inconsistent shapes
    #[error("Corrupt model artifact: {0}")]
    CorruptModel(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
