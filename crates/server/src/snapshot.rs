//! # Recommender Snapshot
//!
//! A snapshot is everything a recommendation query reads: the catalog, the
//! fitted encoder and the neighbor index built from that catalog. All three
//! are built together and never mutated afterwards, so queries need no locks.
//!
//! A new catalog means a new snapshot. `SnapshotHandle` lets a long-running
//! process swap snapshots atomically while queries keep running against the
//! `Arc` they already hold.
//!
//! ## Learning Goals
//!
//! - Sharing immutable data across threads with `Arc`
//! - Swapping shared state with `RwLock<Arc<T>>` (short write, no reader stalls)
//! - Building a value all-or-nothing with `?`

use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::info;

use data_loader::Catalog;
use features::FeatureEncoder;
use neighbors::NeighborIndex;

use crate::config::RecommenderConfig;
use crate::error::Result;

/// Catalog, encoder and index of one catalog version
#[derive(Debug)]
pub struct RecommenderSnapshot {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) encoder: FeatureEncoder,
    pub(crate) index: NeighborIndex,
    pub(crate) config: RecommenderConfig,
}

impl RecommenderSnapshot {
    /// Fit the encoder over `catalog`, encode every record and build the index.
    ///
    /// Index row `i` belongs to catalog position `i`. Any failure aborts the
    /// build; there is no partially built snapshot.
    ///
    /// # Errors
    /// * `Encoder(EmptyCatalog)` - the catalog has no records
    /// * `Encoder(InvalidWeight)` - `config.numeric_weight` is negative or not finite
    pub fn build(catalog: Arc<Catalog>, config: RecommenderConfig) -> Result<Self> {
        let start_time = Instant::now();

        let encoder = FeatureEncoder::fit(catalog.records(), config.encoder_config())?;
        let vectors = encoder.encode_all(catalog.records());
        let keys: Vec<String> = catalog.titles().map(str::to_string).collect();
        let index = NeighborIndex::build(vectors, keys, config.metric)?;

        info!(
            "Built snapshot: {} movies, {} dimensions, {} metric in {:.2?}",
            index.len(),
            index.dimension(),
            config.metric,
            start_time.elapsed()
        );

        Ok(Self {
            catalog,
            encoder,
            index,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle to the catalog, for callers that outlive the snapshot borrow
    pub fn catalog_arc(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Fingerprint of the vector layout this snapshot was built with
    pub fn fingerprint(&self) -> String {
        self.encoder.vocabulary().fingerprint()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Swappable reference to the current snapshot.
///
/// Rust concept: readers clone the inner `Arc` and drop the lock right away,
/// so a slow query never blocks `replace`, and a replaced snapshot stays
/// alive until its last reader finishes.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<RecommenderSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: RecommenderSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot queries should run against right now
    pub fn current(&self) -> Arc<RecommenderSnapshot> {
        // A poisoned lock still holds a complete snapshot; the swap is a
        // single assignment and cannot be observed half done
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Install a new snapshot and return the one it replaced
    pub fn replace(&self, snapshot: RecommenderSnapshot) -> Arc<RecommenderSnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            "Replaced snapshot: {} -> {} movies",
            previous.len(),
            guard.len()
        );
        previous
    }
}
