//! Genre vocabulary: the fixed set of genre tokens that defines the one-hot
//! positions of every feature vector.

use crate::error::{EncoderError, Result};
use data_loader::MovieRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

/// Version of the vector layout produced by `FeatureEncoder`.
///
/// Bump this whenever the meaning or order of dimensions changes; persisted
/// indices carrying an older version are then rejected as stale.
pub const ENCODER_SCHEMA_VERSION: u32 = 1;

/// Digest bytes kept in a fingerprint (rendered as twice as many hex digits)
const FINGERPRINT_BYTES: usize = 8;

/// Ordered set of genre tokens.
///
/// Tokens are sorted lexicographically, so the same catalog always yields the
/// same vector positions. Once built the vocabulary never changes; a new
/// catalog snapshot gets a new vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GenreVocabulary {
    tokens: Vec<String>,
    positions: HashMap<String, usize>,
}

impl GenreVocabulary {
    /// Scan every record's genres and fix the vocabulary.
    ///
    /// Empty tokens and the `nan` marker are discarded. Fails with
    /// `EmptyCatalog` when there are no records at all.
    pub fn build(records: &[MovieRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(EncoderError::EmptyCatalog);
        }

        let tokens: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.genres.iter())
            .map(|g| g.trim())
            .filter(|g| is_valid_token(g))
            .collect();

        Ok(Self::from(
            tokens.into_iter().map(str::to_string).collect::<Vec<_>>(),
        ))
    }

    /// Position of a token, `None` for tokens outside the vocabulary
    pub fn position(&self, genre: &str) -> Option<usize> {
        self.positions.get(genre.trim()).copied()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Stable fingerprint of the vocabulary under the current schema version.
    ///
    /// SHA-256 over the schema version and the ordered tokens, truncated to
    /// 8 bytes and rendered as 16 hex digits. Two vocabularies share a
    /// fingerprint only if they would produce the same vector layout.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("schema:{}\n", ENCODER_SCHEMA_VERSION).as_bytes());
        for token in &self.tokens {
            hasher.update(token.as_bytes());
            hasher.update(b"\n");
        }
        let digest = hasher.finalize();

        digest[..FINGERPRINT_BYTES]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl From<Vec<String>> for GenreVocabulary {
    fn from(tokens: Vec<String>) -> Self {
        // Normalise on the way in so deserialized vocabularies obey the same
        // ordering and token rules as freshly built ones
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| is_valid_token(t))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let positions = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { tokens, positions }
    }
}

impl From<GenreVocabulary> for Vec<String> {
    fn from(vocabulary: GenreVocabulary) -> Self {
        vocabulary.tokens
    }
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && !token.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord::new(title, 7.0, 100).with_genres(genres.iter().copied())
    }

    #[test]
    fn test_vocabulary_is_sorted_union() {
        let vocabulary = GenreVocabulary::build(&[
            record("A", &["Thriller", "Action"]),
            record("B", &["Drama", "Action"]),
        ])
        .unwrap();

        assert_eq!(vocabulary.tokens(), &["Action", "Drama", "Thriller"]);
        assert_eq!(vocabulary.position("Drama"), Some(1));
        assert_eq!(vocabulary.position("Western"), None);
    }

    #[test]
    fn test_vocabulary_discards_invalid_tokens() {
        let vocabulary =
            GenreVocabulary::build(&[record("A", &["nan", "", "  ", "Comedy"])]).unwrap();
        assert_eq!(vocabulary.tokens(), &["Comedy"]);
    }

    #[test]
    fn test_empty_catalog_fails() {
        assert_eq!(GenreVocabulary::build(&[]), Err(EncoderError::EmptyCatalog));
    }

    #[test]
    fn test_genre_less_catalog_gives_empty_vocabulary() {
        let vocabulary = GenreVocabulary::build(&[record("A", &[])]).unwrap();
        assert!(vocabulary.is_empty());
    }

    #[test]
    fn test_fingerprint_depends_on_tokens_not_input_order() {
        let a = GenreVocabulary::build(&[record("A", &["Drama", "Action"])]).unwrap();
        let b = GenreVocabulary::build(&[record("B", &["Action"]), record("C", &["Drama"])]).unwrap();
        let c = GenreVocabulary::build(&[record("D", &["Action"])]).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);
    }

    #[test]
    fn test_fingerprint_is_hex_and_separates_tokens() {
        let joined = GenreVocabulary::from(vec!["ab".to_string(), "c".to_string()]);
        let split = GenreVocabulary::from(vec!["a".to_string(), "bc".to_string()]);

        let fingerprint = joined.fingerprint();
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(fingerprint, split.fingerprint());
        assert_eq!(fingerprint, joined.clone().fingerprint());
    }

    #[test]
    fn test_deserialized_vocabulary_rebuilds_positions() {
        let vocabulary = GenreVocabulary::build(&[record("A", &["Drama", "Action"])]).unwrap();
        let json = serde_json::to_string(&vocabulary).unwrap();
        assert_eq!(json, r#"["Action","Drama"]"#);

        let restored: GenreVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.position("Drama"), Some(1));
        assert_eq!(restored.fingerprint(), vocabulary.fingerprint());
    }
}
