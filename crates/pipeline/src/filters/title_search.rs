//! Free-text title search.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Keeps movies whose title contains the query, ignoring case.
///
/// An empty (or all-whitespace) query keeps everything.
pub struct TitleSearchFilter {
    needle: String,
}

impl TitleSearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }
}

impl Filter for TitleSearchFilter {
    fn name(&self) -> &str {
        "TitleSearchFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        if self.needle.is_empty() {
            return Ok(movies);
        }
        Ok(movies
            .into_iter()
            .filter(|movie| movie.title.to_lowercase().contains(&self.needle))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_substring() {
        let amelie = MovieRecord::new("Le Fabuleux Destin d'Amélie Poulain", 8.3, 122);
        let heat = MovieRecord::new("Heat", 8.3, 170);

        let filtered = TitleSearchFilter::new("AMÉLIE")
            .apply(vec![&amelie, &heat])
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, amelie.title);
    }

    #[test]
    fn test_empty_query_keeps_all() {
        let a = MovieRecord::new("A", 7.0, 100);
        let b = MovieRecord::new("B", 7.0, 100);
        assert_eq!(TitleSearchFilter::new("  ").apply(vec![&a, &b]).unwrap().len(), 2);
    }
}
