//! Feature encoding for content-based movie similarity.
//!
//! This crate turns catalog records into fixed-length numeric vectors:
//! - GenreVocabulary fixes the one-hot genre positions
//! - NumericScaler brings rating, runtime, year and votes to a common scale
//! - FeatureEncoder combines both into the final vector
//!
//! ## Architecture
//! Encoding happens in two phases:
//! 1. Fit: scan the whole catalog once (vocabulary + column statistics)
//! 2. Encode: pure per-record mapping that reuses the fitted parameters
//!
//! Vectors from different fits are not comparable; the vocabulary
//! fingerprint tells them apart.
//!
//! ## Example Usage
//! ```ignore
//! use features::{EncoderConfig, FeatureEncoder};
//!
//! let encoder = FeatureEncoder::fit(catalog.records(), EncoderConfig::default())?;
//! let vectors = encoder.encode_all(catalog.records());
//! ```

pub mod error;
pub mod vocabulary;
pub mod scaler;
pub mod encoder;

// Re-export main types
pub use error::{EncoderError, Result};
pub use vocabulary::{ENCODER_SCHEMA_VERSION, GenreVocabulary};
pub use scaler::{ColumnStats, NUMERIC_COLUMN_NAMES, NUMERIC_COLUMNS, NumericScaler, NumericScaling};
pub use encoder::{EncoderConfig, FeatureEncoder, FeatureVector};
