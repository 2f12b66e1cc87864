//! Catalog browsing: filtering, sorting and pagination of catalog views.
//!
//! This crate provides:
//! - Filter trait and implementations for narrowing the catalog
//! - FilterPipeline for composing filters
//! - SortOrder for ordering a view
//! - Page/PageRequest for caller-owned pagination
//!
//! ## Architecture
//! A browsing request is processed in stages:
//! 1. Filters remove movies that do not match the user's choices
//! 2. The remaining view is sorted
//! 3. The sorted view is cut into the requested page
//!
//! Views borrow records from the `Catalog`; nothing is cloned.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{browse, FilterPipeline, PageRequest, SortOrder};
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(GenreFilter::new("Drama"))
//!     .add_filter(MinimumRatingFilter::new(7.0));
//!
//! let page = browse(&catalog, &pipeline, SortOrder::YearDesc, PageRequest::new(1, 24))?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod sort;
pub mod pagination;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use sort::SortOrder;
pub use pagination::{Page, PageRequest};

use anyhow::Result;
use data_loader::{Catalog, MovieRecord};

/// Filter, sort and paginate the catalog in one call
pub fn browse<'a>(
    catalog: &'a Catalog,
    pipeline: &FilterPipeline,
    order: SortOrder,
    request: PageRequest,
) -> Result<Page<&'a MovieRecord>> {
    let mut movies = pipeline.apply(catalog)?;
    order.sort(&mut movies);
    Ok(Page::paginate(movies, request))
}
