//! Error types for the data-loader crate.
//!
//! Covers reading the review table, rebuilding identifier mappings from
//! persisted tables, and writing artifacts through an [`ArtifactStore`].
//!
//! [`ArtifactStore`]: crate::store::ArtifactStore

use thiserror::Error;

/// Errors that can occur while loading, indexing or persisting data
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Row in a data file couldn't be parsed
    ///
    /// `line` is 1-based and counts the header row.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same raw value appears twice in a mapping table
    #[error("Duplicate value in {table} mapping at index {index}")]
    DuplicateMapping { table: String, index: usize },

    /// A table could not be encoded or decoded
    #[error("Table {table} could not be serialized: {reason}")]
    Serialization { table: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
