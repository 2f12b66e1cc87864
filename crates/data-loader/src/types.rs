//! Core domain types for the movie catalog.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Structs with public fields
//! - `Option<T>` for values that may be unknown
//! - Derive macros for common traits
//! - HashMap and BTreeMap for efficient lookups

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Highest rating a catalog entry may carry (ratings are on a 0-10 scale)
pub const MAX_RATING: f32 = 10.0;

// =============================================================================
// Movie Record
// =============================================================================

/// One entry of the catalog.
///
/// The title is the catalog key: it is unique within a `Catalog` and is the
/// handle used for "similar to" queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    /// Genre tokens, already cleaned (no empty or `nan` tokens)
    ///
    /// Rust concept: `BTreeSet<T>` keeps the set sorted, so iteration order
    /// is the same on every run
    pub genres: BTreeSet<String>,
    /// Average rating on a 0-10 scale
    pub rating: f32,
    pub runtime_minutes: u32,
    /// Release year, `None` when the source row had no usable date
    pub release_year: Option<u16>,
    pub vote_count: u64,
    /// Original language code (e.g. "fr"), if known
    pub language: Option<String>,
}

impl MovieRecord {
    /// Create a record with the required fields; year and language start unknown.
    pub fn new(title: impl Into<String>, rating: f32, runtime_minutes: u32) -> Self {
        Self {
            title: title.into(),
            genres: BTreeSet::new(),
            rating,
            runtime_minutes,
            release_year: None,
            vote_count: 0,
            language: None,
        }
    }

    /// Add genres (builder pattern)
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(genres.into_iter().map(Into::into));
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_votes(mut self, vote_count: u64) -> Self {
        self.vote_count = vote_count;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Case-insensitive genre membership check
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

// =============================================================================
// Summary Types
// =============================================================================

/// Catalog-wide KPIs shown on a dashboard front page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total_movies: usize,
    /// Mean rating over all movies (0.0 for an empty catalog)
    pub average_rating: f32,
    /// Sum of all runtimes in whole hours (rounded down)
    pub total_runtime_hours: u64,
    pub distinct_genres: usize,
    /// Earliest and latest known release year
    pub year_range: Option<(u16, u16)>,
}

/// Counts of rows removed while cleaning a raw catalog file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub missing_required: usize,
    pub non_positive: usize,
    pub out_of_range: usize,
    pub duplicate_titles: usize,
}

impl CleaningReport {
    /// Total rows dropped for any reason
    pub fn dropped(&self) -> usize {
        self.missing_required + self.non_positive + self.out_of_range + self.duplicate_titles
    }
}

// =============================================================================
// Catalog - The Immutable In-Memory Store
// =============================================================================

/// Immutable, in-memory table of movie records keyed by title.
///
/// Built once (see `Catalog::from_records` / `Catalog::load_from_file`) and
/// only read afterwards. Record positions are stable: position `i` is the
/// `i`-th record in insertion order, which is the order encoders and indices
/// see the catalog in.
///
/// Rust concepts demonstrated:
/// - HashMap<K, V> for O(1) title lookups
/// - BTreeMap<K, V> for sorted key access (genres, years)
/// - Borrowing: methods return `&T` (references) not `T` (owned values)
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) records: Vec<MovieRecord>,
    pub(crate) by_title: HashMap<String, usize>,

    // Secondary indices for browsing queries
    /// Positions grouped by genre token (one movie can appear in several lists)
    pub(crate) genre_index: BTreeMap<String, Vec<usize>>,
    /// Positions grouped by release year
    pub(crate) year_index: BTreeMap<u16, Vec<usize>>,
}

impl Catalog {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by exact title
    ///
    /// Returns `Option<&MovieRecord>`:
    /// - `Some(&record)` if the title exists (borrowing it)
    /// - `None` otherwise
    pub fn get(&self, title: &str) -> Option<&MovieRecord> {
        self.position(title).map(|i| &self.records[i])
    }

    /// Position of a title in insertion order
    pub fn position(&self, title: &str) -> Option<usize> {
        self.by_title.get(title).copied()
    }

    pub fn get_by_position(&self, position: usize) -> Option<&MovieRecord> {
        self.records.get(position)
    }

    /// All records in insertion order
    ///
    /// Rust concept: `&[T]` is a slice (view into a vector)
    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    /// Titles in insertion order (the key array of a neighbor index)
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Positions of all movies tagged with a genre (exact token match)
    pub fn get_movies_by_genre(&self, genre: &str) -> &[usize] {
        self.genre_index
            .get(genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Positions of all movies released in a year
    pub fn get_movies_by_year(&self, year: u16) -> &[usize] {
        self.year_index
            .get(&year)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct genre tokens, sorted
    pub fn genres(&self) -> Vec<&str> {
        self.genre_index.keys().map(|g| g.as_str()).collect()
    }

    /// Known release years, newest first
    pub fn years_desc(&self) -> Vec<u16> {
        self.year_index.keys().rev().copied().collect()
    }
}
