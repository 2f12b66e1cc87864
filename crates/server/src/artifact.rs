//! Persisted index artifacts.
//!
//! An artifact is a JSON document holding everything needed to answer
//! queries without refitting: the vector schema version, the vocabulary and
//! its fingerprint, the fitted scaler, the config, and the encoded rows with
//! their keys. Loading checks the artifact against the running encoder code
//! and the catalog it is paired with; any disagreement is a `StaleIndex`
//! error and the caller should rebuild.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use data_loader::Catalog;
use features::{
    ENCODER_SCHEMA_VERSION, FeatureEncoder, FeatureVector, GenreVocabulary, NUMERIC_COLUMNS,
    NumericScaler,
};
use neighbors::{IndexError, NeighborIndex};

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::snapshot::RecommenderSnapshot;

/// Relative tolerance when comparing refitted scaler statistics; JSON floats
/// are not guaranteed to round-trip to the last bit
const STATS_TOLERANCE: f64 = 1e-9;

/// Absolute tolerance when comparing a stored row against a fresh encode
const ROW_TOLERANCE: f32 = 1e-5;

/// On-disk form of a `RecommenderSnapshot` (without the catalog itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub schema_version: u32,
    pub fingerprint: String,
    pub config: RecommenderConfig,
    pub vocabulary: GenreVocabulary,
    pub scaler: NumericScaler,
    pub keys: Vec<String>,
    pub vectors: Vec<FeatureVector>,
}

impl IndexArtifact {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl RecommenderSnapshot {
    /// Capture the fitted state of this snapshot
    pub fn to_artifact(&self) -> IndexArtifact {
        let vectors = (0..self.index.len())
            .filter_map(|position| self.index.vector(position).map(<[f32]>::to_vec))
            .collect();

        IndexArtifact {
            schema_version: ENCODER_SCHEMA_VERSION,
            fingerprint: self.fingerprint(),
            config: self.config,
            vocabulary: self.encoder.vocabulary().clone(),
            scaler: self.encoder.scaler().clone(),
            keys: self.index.keys().to_vec(),
            vectors,
        }
    }

    /// Write this snapshot's artifact to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact = self.to_artifact();
        artifact.write_to(path)?;
        info!(
            "Saved index artifact to {} ({} rows, fingerprint {})",
            path.display(),
            artifact.keys.len(),
            artifact.fingerprint
        );
        Ok(())
    }

    /// Read an artifact from `path` and pair it with `catalog`.
    ///
    /// # Errors
    /// * `StaleIndex` - see [`RecommenderSnapshot::from_artifact`]
    /// * `Io` / `Serialization` - the file is missing or not an artifact
    pub fn load(path: &Path, catalog: Arc<Catalog>) -> Result<Self> {
        let artifact = IndexArtifact::read_from(path)?;
        let snapshot = Self::from_artifact(artifact, catalog)?;
        info!(
            "Loaded index artifact from {} ({} rows)",
            path.display(),
            snapshot.len()
        );
        Ok(snapshot)
    }

    /// Rebuild a snapshot from an artifact without refitting.
    ///
    /// The artifact is rejected as `StaleIndex` when:
    /// - its schema version differs from `ENCODER_SCHEMA_VERSION`
    /// - its fingerprint does not match its own vocabulary under the current code
    /// - the catalog's vocabulary has a different fingerprint
    /// - its keys are not the catalog titles in catalog order
    /// - the catalog's numeric statistics no longer match the stored scaler
    /// - any stored row differs from its catalog record encoded with the
    ///   stored vocabulary and scaler (edits that keep vocabulary and
    ///   statistics intact, like two movies trading genres or ratings)
    pub fn from_artifact(artifact: IndexArtifact, catalog: Arc<Catalog>) -> Result<Self> {
        if artifact.schema_version != ENCODER_SCHEMA_VERSION {
            return Err(stale(format!(
                "schema version {} (expected {})",
                artifact.schema_version, ENCODER_SCHEMA_VERSION
            )));
        }

        let artifact_fingerprint = artifact.vocabulary.fingerprint();
        if artifact_fingerprint != artifact.fingerprint {
            return Err(stale(format!(
                "fingerprint {} does not match stored vocabulary ({})",
                artifact.fingerprint, artifact_fingerprint
            )));
        }

        let catalog_vocabulary = GenreVocabulary::build(catalog.records())?;
        let catalog_fingerprint = catalog_vocabulary.fingerprint();
        if catalog_fingerprint != artifact.fingerprint {
            return Err(stale(format!(
                "catalog fingerprint {} differs from artifact fingerprint {}",
                catalog_fingerprint, artifact.fingerprint
            )));
        }

        if artifact.keys.len() != catalog.len()
            || !artifact.keys.iter().map(String::as_str).eq(catalog.titles())
        {
            return Err(stale(format!(
                "artifact keys ({}) do not match catalog titles ({})",
                artifact.keys.len(),
                catalog.len()
            )));
        }

        let refit = NumericScaler::fit(
            catalog.records(),
            artifact.scaler.scaling(),
            artifact.scaler.numeric_weight(),
        )?;
        if !scalers_match(&refit, &artifact.scaler) {
            return Err(stale("catalog numeric statistics changed".to_string()));
        }

        let encoder = FeatureEncoder::from_parts(artifact.vocabulary, artifact.scaler);
        let index = NeighborIndex::build(artifact.vectors, artifact.keys, artifact.config.metric)?;
        if index.dimension() != encoder.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: encoder.dimension(),
                found: index.dimension(),
            }
            .into());
        }

        let fresh = encoder.encode_all(catalog.records());
        for (position, (record, expected)) in catalog.records().iter().zip(&fresh).enumerate() {
            let stored = index.vector(position).unwrap_or_default();
            let same = stored.len() == expected.len()
                && stored
                    .iter()
                    .zip(expected)
                    .all(|(a, b)| (a - b).abs() <= ROW_TOLERANCE);
            if !same {
                return Err(stale(format!(
                    "row {} ({}) no longer matches its catalog record",
                    position, record.title
                )));
            }
        }

        Ok(Self {
            catalog,
            encoder,
            index,
            config: artifact.config,
        })
    }
}

fn stale(reason: String) -> RecommendError {
    warn!("Rejecting index artifact: {}", reason);
    RecommendError::StaleIndex { reason }
}

fn scalers_match(a: &NumericScaler, b: &NumericScaler) -> bool {
    let close = |x: f64, y: f64| (x - y).abs() <= STATS_TOLERANCE * x.abs().max(y.abs()).max(1.0);

    a.scaling() == b.scaling()
        && a.numeric_weight() == b.numeric_weight()
        && (0..NUMERIC_COLUMNS).all(|i| match (a.column(i), b.column(i)) {
            (Some(x), Some(y)) => {
                close(x.min, y.min) && close(x.max, y.max) && close(x.mean, y.mean) && close(x.std, y.std)
            }
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    fn records() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("Heat", 8.3, 170)
                .with_genres(["Crime", "Drama"])
                .with_year(1995)
                .with_votes(700_000),
            MovieRecord::new("Ronin", 7.2, 122)
                .with_genres(["Action", "Crime"])
                .with_year(1998)
                .with_votes(220_000),
            MovieRecord::new("Collateral", 7.5, 120)
                .with_genres(["Crime", "Drama", "Thriller"])
                .with_year(2004)
                .with_votes(420_000),
        ]
    }

    fn catalog(records: Vec<MovieRecord>) -> Arc<Catalog> {
        Arc::new(Catalog::from_records(records).unwrap())
    }

    fn snapshot() -> RecommenderSnapshot {
        RecommenderSnapshot::build(catalog(records()), RecommenderConfig::default()).unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let snapshot = snapshot();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        snapshot.save(&path).unwrap();
        let loaded = RecommenderSnapshot::load(&path, snapshot.catalog_arc()).unwrap();

        assert_eq!(loaded.len(), snapshot.len());
        assert_eq!(loaded.fingerprint(), snapshot.fingerprint());
        assert_eq!(loaded.config(), snapshot.config());
        assert_eq!(loaded.index().keys(), snapshot.index().keys());
        for position in 0..snapshot.len() {
            let a = snapshot.index().vector(position).unwrap();
            let b = loaded.index().vector(position).unwrap();
            assert!(a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6));
        }
    }

    #[test]
    fn test_schema_version_mismatch_is_stale() {
        let mut artifact = snapshot().to_artifact();
        artifact.schema_version = ENCODER_SCHEMA_VERSION + 1;

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(records()));
        assert!(matches!(result, Err(RecommendError::StaleIndex { .. })));
    }

    #[test]
    fn test_tampered_fingerprint_is_stale() {
        let mut artifact = snapshot().to_artifact();
        artifact.fingerprint = "0000000000000000".to_string();

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(records()));
        assert!(matches!(result, Err(RecommendError::StaleIndex { .. })));
    }

    #[test]
    fn test_new_genre_in_catalog_is_stale() {
        let artifact = snapshot().to_artifact();
        let mut changed = records();
        changed[1] = MovieRecord::new("Ronin", 7.2, 122)
            .with_genres(["Action", "Crime", "Mystery"])
            .with_year(1998)
            .with_votes(220_000);

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(changed));
        match result {
            Err(RecommendError::StaleIndex { reason }) => assert!(reason.contains("fingerprint")),
            other => panic!("expected StaleIndex, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_reordered_catalog_is_stale() {
        let artifact = snapshot().to_artifact();
        let mut reordered = records();
        reordered.swap(0, 2);

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(reordered));
        assert!(matches!(result, Err(RecommendError::StaleIndex { .. })));
    }

    #[test]
    fn test_changed_rating_is_stale() {
        let artifact = snapshot().to_artifact();
        let mut changed = records();
        changed[0].rating = 9.1;

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(changed));
        assert!(matches!(result, Err(RecommendError::StaleIndex { .. })));
    }

    fn plain(title: &str, genre: &str, rating: f32) -> MovieRecord {
        MovieRecord::new(title, rating, 100)
            .with_genres([genre])
            .with_year(2000)
            .with_votes(1000)
    }

    #[test]
    fn test_swapped_genres_are_stale() {
        let original = vec![
            plain("A", "Drama", 7.0),
            plain("B", "Horror", 7.0),
            plain("C", "Drama", 7.0),
        ];
        let artifact = RecommenderSnapshot::build(catalog(original), RecommenderConfig::default())
            .unwrap()
            .to_artifact();

        // Same titles, same vocabulary, same numeric statistics
        let swapped = vec![
            plain("A", "Horror", 7.0),
            plain("B", "Drama", 7.0),
            plain("C", "Drama", 7.0),
        ];
        match RecommenderSnapshot::from_artifact(artifact, catalog(swapped)) {
            Err(RecommendError::StaleIndex { reason }) => assert!(reason.contains("row 0 (A)")),
            other => panic!("expected StaleIndex, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_swapped_ratings_are_stale() {
        let artifact = snapshot().to_artifact();
        let mut swapped = records();
        let (heat, ronin) = (swapped[0].rating, swapped[1].rating);
        swapped[0].rating = ronin;
        swapped[1].rating = heat;

        let result = RecommenderSnapshot::from_artifact(artifact, catalog(swapped));
        match result {
            Err(RecommendError::StaleIndex { reason }) => assert!(reason.contains("Heat")),
            other => panic!("expected StaleIndex, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecommenderSnapshot::load(&dir.path().join("missing.json"), catalog(records()));
        assert!(matches!(result, Err(RecommendError::Io(_))));
    }
}
