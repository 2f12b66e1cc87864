//! Brute-force k-nearest-neighbor index.
//!
//! ## Algorithm
//! 1. Compute the distance from the query to every stored row (parallel scan)
//! 2. Partially select the `k` smallest under (distance, position)
//! 3. Sort those `k` by the same key
//!
//! The (distance, position) key is a total order, so the partial selection
//! returns exactly what a stable full sort would: ties are broken by
//! insertion order.
//!
//! O(N·D) per query, which is fine for catalogs in the tens of thousands.

use crate::error::{IndexError, Result};
use crate::metric::{DistanceMetric, norm};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// One query hit
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Row of the hit, which is also its position in the source catalog
    pub position: usize,
    pub key: String,
    pub distance: f32,
}

/// Immutable matrix of feature vectors with a parallel key array.
///
/// Row `i` of the matrix belongs to `keys[i]`. The index is built once and
/// never mutated; a new catalog snapshot means building a new index.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    metric: DistanceMetric,
    dimension: usize,
    /// Row-major `len × dimension` matrix
    data: Vec<f32>,
    keys: Vec<String>,
    /// Row norms, used by the cosine metric
    norms: Vec<f32>,
}

impl NeighborIndex {
    /// Build an index from vectors and their keys.
    ///
    /// # Errors
    /// * `KeyCountMismatch` - `vectors.len() != keys.len()`
    /// * `EmptyIndex` - no vectors
    /// * `DimensionMismatch` - vectors of different lengths
    pub fn build(vectors: Vec<Vec<f32>>, keys: Vec<String>, metric: DistanceMetric) -> Result<Self> {
        if vectors.len() != keys.len() {
            return Err(IndexError::KeyCountMismatch {
                vectors: vectors.len(),
                keys: keys.len(),
            });
        }
        let dimension = match vectors.first() {
            Some(first) => first.len(),
            None => return Err(IndexError::EmptyIndex),
        };

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        let mut norms = Vec::with_capacity(vectors.len());
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    found: vector.len(),
                });
            }
            data.extend_from_slice(vector);
            norms.push(norm(vector));
        }

        debug!(
            "Built {} index: {} rows x {} dims",
            metric,
            keys.len(),
            dimension
        );
        Ok(Self {
            metric,
            dimension,
            data,
            keys,
            norms,
        })
    }

    /// Return the `k` entries closest to `vector`, nearest first.
    ///
    /// # Errors
    /// * `InvalidK` - `k == 0` or `k > self.len()`
    /// * `DimensionMismatch` - query length differs from the index dimension
    #[instrument(skip(self, vector), fields(size = self.keys.len()))]
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || k > self.len() {
            return Err(IndexError::InvalidK { k, size: self.len() });
        }
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                found: vector.len(),
            });
        }

        let query_norm = norm(vector);
        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .into_par_iter()
            .map(|position| {
                let start = position * self.dimension;
                let row = &self.data[start..start + self.dimension];
                let distance = self
                    .metric
                    .distance(vector, row, query_norm, self.norms[position]);
                (position, distance)
            })
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, compare_hits);
            scored.truncate(k);
        }
        scored.sort_unstable_by(compare_hits);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| Neighbor {
                position,
                key: self.keys[position].clone(),
                distance,
            })
            .collect())
    }

    /// Stored vector of a row
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    pub fn key(&self, position: usize) -> Option<&str> {
        self.keys.get(position).map(|k| k.as_str())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of rows; always equals the number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

/// Ascending distance, then ascending position
fn compare_hits(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}
