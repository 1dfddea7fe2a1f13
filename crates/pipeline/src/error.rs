//! Errors raised by the interaction filter.

use thiserror::Error;

/// Corpus-level failures that abort the run.
///
/// Stage-local conditions (zero spread, invalid actor ids) are not errors;
/// they are summarised in [`FilterReport`](crate::FilterReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A stage left no rows to work with
    #[error("Empty corpus after {stage}: {detail}")]
    EmptyCorpus { stage: String, detail: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
