//! # Data Loader Crate
//!
//! This crate loads, cleans and indexes the movie catalog that every other
//! crate in the workspace reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, Catalog, CatalogSummary)
//! - **parser**: Parse `::`-separated catalog files into raw rows
//! - **index**: Clean raw rows and build the catalog's lookup indices
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! // Load the catalog (cleaning happens here)
//! let catalog = Catalog::load_from_file(Path::new("data/movies.dat"))?;
//!
//! // Query data
//! let movie = catalog.get("Inception").unwrap();
//! let dramas = catalog.get_movies_by_genre("Drama");
//!
//! println!("{} is one of {} dramas", movie.title, dramas.len());
//! ```
//!
//! ## Learning Goals
//!
//! 1. **Ownership and Borrowing**: Catalog owns the records, methods return references
//! 2. **Error Handling**: Using Result<T> and custom error types
//! 3. **Collections**: HashMap and BTreeMap for efficient lookups
//! 4. **Immutability**: The catalog is built once and only read afterwards

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::RawMovieRow;
pub use types::{Catalog, CatalogSummary, CleaningReport, MovieRecord, MAX_RATING};
