//! Filter to keep only movies tagged with a given genre.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Keeps movies whose genre set contains the requested genre.
///
/// Matching is case-insensitive on whole tokens, so "drama" matches
/// "Drama" but not "Docudrama".
pub struct GenreFilter {
    genre: String,
}

impl GenreFilter {
    pub fn new(genre: impl Into<String>) -> Self {
        Self {
            genre: genre.into().trim().to_string(),
        }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        Ok(movies
            .into_iter()
            .filter(|movie| movie.has_genre(&self.genre))
            .collect())
    }
}
