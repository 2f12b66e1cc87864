//! Error types for the neighbors crate.

use thiserror::Error;

/// Errors raised while building or querying a `NeighborIndex`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// An index needs at least one vector
    #[error("Cannot build a neighbor index without vectors")]
    EmptyIndex,

    /// A vector's length differs from the index dimension
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Every vector needs exactly one key
    #[error("Key count mismatch: {vectors} vectors but {keys} keys")]
    KeyCountMismatch { vectors: usize, keys: usize },

    /// `k` must be in `1..=size`
    #[error("Invalid k: {k} (index holds {size} entries)")]
    InvalidK { k: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, IndexError>;
