//! Crate-wide error type.
//!
//! Malformed dataset rows are not errors (they are skipped and counted by
//! the builder). Everything that stops an operation outright lands here.

use thiserror::Error;

/// Errors produced by dataset loading, configuration, and graph commands.
#[derive(Debug, Error)]
pub enum GenreGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset header lacks a required column.
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("config error: {0}")]
    Config(String),

    /// A traversal was requested before any graph was built.
    #[error("graph has not been built yet")]
    GraphNotBuilt,

    /// The operation observed its cancellation token and stopped early.
    #[error("operation cancelled")]
    Cancelled,

    /// A worker thread panicked or hung up before reporting a result.
    #[error("worker failed: {0}")]
    Worker(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_yaml::Error> for GenreGraphError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenreGraphError>;
