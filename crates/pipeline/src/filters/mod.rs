//! Filter implementations for the browsing pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod genre;
pub mod language;
pub mod minimum_rating;
pub mod release_year;
pub mod runtime;
pub mod title_search;

// Re-export for convenience
pub use genre::GenreFilter;
pub use language::LanguageFilter;
pub use minimum_rating::MinimumRatingFilter;
pub use release_year::ReleaseYearFilter;
pub use runtime::{RuntimeBand, RuntimeFilter};
pub use title_search::TitleSearchFilter;
