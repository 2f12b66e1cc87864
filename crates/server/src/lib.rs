//! # Server Crate
//!
//! The recommendation core: build a snapshot (catalog + fitted encoder +
//! neighbor index) once, then answer "similar movies" queries against it from
//! any number of threads.
//!
//! ## Main Components
//!
//! - **config**: `RecommenderConfig`, passed explicitly to every build
//! - **snapshot**: `RecommenderSnapshot` and the swappable `SnapshotHandle`
//! - **artifact**: Save and load snapshots, with stale-index detection
//! - **recommender**: `RecommendationService` and the `recommend` operations
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use data_loader::Catalog;
//! use server::{RecommendationService, RecommenderConfig, RecommenderSnapshot};
//!
//! let catalog = Arc::new(Catalog::load_from_file(path)?);
//! let snapshot = RecommenderSnapshot::build(catalog, RecommenderConfig::default())?;
//! let service = RecommendationService::new(snapshot);
//!
//! for movie in service.recommend("Heat", 5)? {
//!     println!("{}", movie.title);
//! }
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod recommender;
pub mod snapshot;

pub use artifact::IndexArtifact;
pub use config::RecommenderConfig;
pub use error::{RecommendError, Result};
pub use recommender::{recommend, recommend_scored, RecommendationService, ScoredMovie};
pub use snapshot::{RecommenderSnapshot, SnapshotHandle};
