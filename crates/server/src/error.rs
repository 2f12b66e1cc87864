//! Error types for the recommendation service.

use data_loader::DataLoadError;
use features::EncoderError;
use neighbors::IndexError;
use thiserror::Error;

/// Everything that can go wrong while building, loading or querying a
/// recommender.
///
/// Per-query outcomes (`MovieNotFound`, `InvalidK`) are expected and
/// recoverable. Encoder and index errors mean the snapshot was wired wrong
/// and should abort startup.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The requested title is not in the catalog
    #[error("Movie not found: {title}")]
    MovieNotFound { title: String },

    /// Recommendation count must be at least 1
    #[error("Invalid recommendation count: {n}")]
    InvalidK { n: usize },

    /// A persisted index no longer matches the encoder or the catalog
    #[error("Stale index: {reason}")]
    StaleIndex { reason: String },

    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Data error: {0}")]
    Data(#[from] DataLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecommendError {
    /// `true` for outcomes a caller can handle by retrying differently
    /// (another title, another count, a rebuilt index)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RecommendError::MovieNotFound { .. }
                | RecommendError::InvalidK { .. }
                | RecommendError::StaleIndex { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
