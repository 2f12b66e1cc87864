//! Filter on release year.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Keeps movies released in exactly one year; unknown years never match.
pub struct ReleaseYearFilter {
    year: u16,
}

impl ReleaseYearFilter {
    pub fn new(year: u16) -> Self {
        Self { year }
    }
}

impl Filter for ReleaseYearFilter {
    fn name(&self) -> &str {
        "ReleaseYearFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        Ok(movies
            .into_iter()
            .filter(|movie| movie.release_year == Some(self.year))
            .collect())
    }
}
