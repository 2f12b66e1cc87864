//! Filter to ensure a minimum quality threshold.
//!
//! Removes movies rated below a floor, so browsing views can hide
//! poorly received titles.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Removes movies rated below `min_rating` (0-10 scale).
pub struct MinimumRatingFilter {
    min_rating: f32,
}

impl MinimumRatingFilter {
    /// Create a new MinimumRatingFilter.
    ///
    /// # Arguments
    /// * `min_rating` - Lowest rating kept, inclusive (typically 6.0-7.0)
    pub fn new(min_rating: f32) -> Self {
        Self { min_rating }
    }
}

impl Filter for MinimumRatingFilter {
    fn name(&self) -> &str {
        "MinimumRatingFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        Ok(movies
            .into_iter()
            .filter(|movie| movie.rating >= self.min_rating)
            .collect())
    }
}
