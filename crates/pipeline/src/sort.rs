//! Sort orders for catalog views.

use data_loader::MovieRecord;
use std::cmp::Ordering;

/// How a browsing view is ordered.
///
/// All orders are stable: movies that compare equal keep catalog order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Best rated first
    #[default]
    RatingDesc,
    RatingAsc,
    /// Newest first; unknown years last
    YearDesc,
    /// Oldest first; unknown years last
    YearAsc,
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    /// Sort a view in place
    pub fn sort(&self, movies: &mut [&MovieRecord]) {
        movies.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &MovieRecord, b: &MovieRecord) -> Ordering {
        match self {
            SortOrder::RatingDesc => b.rating.total_cmp(&a.rating),
            SortOrder::RatingAsc => a.rating.total_cmp(&b.rating),
            SortOrder::YearDesc => compare_years(a.release_year, b.release_year, true),
            SortOrder::YearAsc => compare_years(a.release_year, b.release_year, false),
            SortOrder::TitleAsc => a.title.cmp(&b.title),
            SortOrder::TitleDesc => b.title.cmp(&a.title),
        }
    }
}

/// Known years in the requested direction, unknown years after all known ones
fn compare_years(a: Option<u16>, b: Option<u16>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
