//! # Neighbors Crate
//!
//! Nearest-neighbor search over encoded movie vectors.
//!
//! ## Components
//!
//! - **metric**: Euclidean and cosine distances
//! - **index**: `NeighborIndex`, an immutable matrix of vectors plus a
//!   parallel key array, answering "k nearest to V" by linear scan
//!
//! ## Example Usage
//!
//! ```ignore
//! use neighbors::{DistanceMetric, NeighborIndex};
//!
//! let index = NeighborIndex::build(vectors, titles, DistanceMetric::Euclidean)?;
//! for hit in index.query(&query_vector, 5)? {
//!     println!("{} at {:.3}", hit.key, hit.distance);
//! }
//! ```
//!
//! ## Guarantees
//!
//! - results are strictly ordered by ascending distance
//! - equal distances are ordered by insertion position
//! - the index is read-only after `build`, so it can be shared across threads
//!   behind an `Arc` without locking

pub mod error;
pub mod metric;
pub mod index;

pub use error::{IndexError, Result};
pub use index::{Neighbor, NeighborIndex};
pub use metric::DistanceMetric;
