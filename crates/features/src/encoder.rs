//! Feature encoding: MovieRecord -> fixed-length numeric vector.
//!
//! Vector layout (`D = vocabulary.len() + 4`):
//!
//! | positions      | meaning                                    |
//! |----------------|--------------------------------------------|
//! | `0..V`         | genre one-hot, vocabulary order            |
//! | `V`            | rating                                     |
//! | `V + 1`        | runtime in minutes                         |
//! | `V + 2`        | release year (unknown -> fitted mean)      |
//! | `V + 3`        | `ln(1 + vote_count)`                       |
//!
//! Numeric positions are scaled by the fitted `NumericScaler`.

use crate::error::Result;
use crate::scaler::{NUMERIC_COLUMN_NAMES, NUMERIC_COLUMNS, NumericScaler, NumericScaling};
use crate::vocabulary::GenreVocabulary;
use data_loader::MovieRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Numeric encoding of one record
pub type FeatureVector = Vec<f32>;

/// Fit-time parameters of the encoder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub scaling: NumericScaling,
    pub numeric_weight: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            scaling: NumericScaling::MinMax,
            numeric_weight: 0.5,
        }
    }
}

/// Frozen vocabulary plus fitted scaler.
///
/// After `fit` the encoder is a pure function of its input: encoding the
/// same record twice yields bit-identical vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    vocabulary: GenreVocabulary,
    scaler: NumericScaler,
}

impl FeatureEncoder {
    /// Build the vocabulary and fit the scaler over a catalog.
    ///
    /// Fails with `EmptyCatalog` when `records` is empty.
    pub fn fit(records: &[MovieRecord], config: EncoderConfig) -> Result<Self> {
        let vocabulary = GenreVocabulary::build(records)?;
        let scaler = NumericScaler::fit(records, config.scaling, config.numeric_weight)?;

        debug!(
            "Fitted encoder: {} genres, {:?} scaling, numeric weight {}",
            vocabulary.len(),
            config.scaling,
            config.numeric_weight
        );
        Ok(Self { vocabulary, scaler })
    }

    /// Reassemble an encoder from previously fitted parts
    pub fn from_parts(vocabulary: GenreVocabulary, scaler: NumericScaler) -> Self {
        Self { vocabulary, scaler }
    }

    /// Encode one record.
    ///
    /// Genres outside the vocabulary are ignored; they neither fail nor
    /// change the dimensionality.
    pub fn encode(&self, record: &MovieRecord) -> FeatureVector {
        let mut vector = vec![0.0; self.dimension()];

        for genre in &record.genres {
            if let Some(position) = self.vocabulary.position(genre) {
                vector[position] = 1.0;
            }
        }

        let offset = self.vocabulary.len();
        vector[offset..].copy_from_slice(&self.scaler.transform(record));
        vector
    }

    /// Encode every record in parallel, preserving input order
    pub fn encode_all(&self, records: &[MovieRecord]) -> Vec<FeatureVector> {
        records.par_iter().map(|r| self.encode(r)).collect()
    }

    /// Vector length `D = |vocabulary| + 4`
    pub fn dimension(&self) -> usize {
        self.vocabulary.len() + NUMERIC_COLUMNS
    }

    pub fn vocabulary(&self) -> &GenreVocabulary {
        &self.vocabulary
    }

    pub fn scaler(&self) -> &NumericScaler {
        &self.scaler
    }

    /// Human-readable name of every dimension, in vector order
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary
            .tokens()
            .iter()
            .map(|g| format!("genre:{}", g))
            .chain(NUMERIC_COLUMN_NAMES.iter().map(|n| n.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncoderError;

    fn records() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("Alien", 8.5, 117)
                .with_genres(["Horror", "Sci-Fi"])
                .with_year(1979)
                .with_votes(900_000),
            MovieRecord::new("Amélie", 8.3, 122)
                .with_genres(["Comedy", "Romance"])
                .with_year(2001)
                .with_votes(780_000),
            MovieRecord::new("Unknown Year", 6.1, 95).with_genres(["Comedy"]),
        ]
    }

    #[test]
    fn test_dimension_and_layout() {
        let encoder = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        assert_eq!(encoder.dimension(), 4 + 4);

        let vector = encoder.encode(&records()[0]);
        assert_eq!(vector.len(), encoder.dimension());
        // Comedy, Horror, Romance, Sci-Fi
        assert_eq!(&vector[..4], &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        for record in &records() {
            let a = encoder.encode(record);
            let b = encoder.encode(record);
            let a_bits: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn test_unknown_genres_are_ignored() {
        let encoder = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        let stranger = MovieRecord::new("Stranger", 7.0, 100).with_genres(["Western", "Comedy"]);

        let vector = encoder.encode(&stranger);
        assert_eq!(vector.len(), encoder.dimension());
        assert_eq!(&vector[..4], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_encode_all_matches_encode() {
        let encoder = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        let all = encoder.encode_all(&records());
        assert_eq!(all.len(), 3);
        for (record, vector) in records().iter().zip(&all) {
            assert_eq!(&encoder.encode(record), vector);
        }
    }

    #[test]
    fn test_empty_catalog() {
        assert_eq!(
            FeatureEncoder::fit(&[], EncoderConfig::default()),
            Err(EncoderError::EmptyCatalog)
        );
    }

    #[test]
    fn test_feature_names() {
        let encoder = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        let names = encoder.feature_names();
        assert_eq!(names.len(), encoder.dimension());
        assert_eq!(names[0], "genre:Comedy");
        assert_eq!(names[encoder.dimension() - 1], "log_vote_count");
    }

    #[test]
    fn test_from_parts_encodes_identically() {
        let fitted = FeatureEncoder::fit(&records(), EncoderConfig::default()).unwrap();
        let rebuilt =
            FeatureEncoder::from_parts(fitted.vocabulary().clone(), fitted.scaler().clone());
        assert_eq!(fitted.encode(&records()[1]), rebuilt.encode(&records()[1]));
    }
}
