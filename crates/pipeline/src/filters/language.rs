//! Filter on original language.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Keeps movies whose original language matches (case-insensitive).
///
/// Movies with an unknown language never match.
pub struct LanguageFilter {
    language: String,
}

impl LanguageFilter {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Filter for LanguageFilter {
    fn name(&self) -> &str {
        "LanguageFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        Ok(movies
            .into_iter()
            .filter(|movie| {
                movie
                    .language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(&self.language))
            })
            .collect())
    }
}
