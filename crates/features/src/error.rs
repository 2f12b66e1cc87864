//! Error types for the features crate.

use thiserror::Error;

/// Errors raised while fitting an encoder.
///
/// These are build-time failures: a snapshot that hits one of them is never
/// served.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncoderError {
    /// No records to learn a vocabulary or scaling parameters from
    #[error("Cannot build an encoder from an empty catalog")]
    EmptyCatalog,

    /// The numeric block weight must be a finite, non-negative number
    #[error("Invalid numeric weight: {0}")]
    InvalidWeight(f32),
}

pub type Result<T> = std::result::Result<T, EncoderError>;
