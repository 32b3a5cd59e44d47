// File: src/error.rs
use thiserror::Error;

/// Everything that can go wrong while indexing, training or persisting.
#[derive(Debug, Error)]
pub enum SpellerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("id mapping could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network could not be (de)serialized: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("word not found in vocabulary: {0}")]
    UnknownWord(String),

    #[error("corpus contains no words")]
    EmptyCorpus,

    #[error("vector width mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SpellerError>;
