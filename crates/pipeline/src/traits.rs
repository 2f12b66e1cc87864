//! Core traits for the browsing pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to a view of the catalog.

use anyhow::Result;
use data_loader::MovieRecord;

/// Core trait for filtering catalog views.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared between request handlers
/// - Filters take ownership of the Vec of borrowed records and return a
///   filtered Vec; the records themselves are never cloned
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of movies.
    ///
    /// # Arguments
    /// * `movies` - The movies to filter (takes ownership of the view)
    ///
    /// # Returns
    /// * `Ok(Vec<&MovieRecord>)` - The movies that pass, in input order
    /// * `Err` - If filtering fails
    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>>;
}
