//! # Recommendation Service
//!
//! Answers "movies similar to this one" from the current snapshot:
//! 1. Validate the requested count
//! 2. Resolve the title to its catalog record
//! 3. Encode the record with the snapshot's fitted encoder (never refit)
//! 4. Ask the index for `n + 1` neighbors, capped at the index size
//! 5. Drop the query movie itself, keep the first `n`
//! 6. Hydrate keys back into catalog records
//!
//! The service holds no per-request state. Any number of threads can call
//! it at once; each call works against the snapshot that was current when
//! it started.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use data_loader::MovieRecord;

use crate::error::{RecommendError, Result};
use crate::snapshot::{RecommenderSnapshot, SnapshotHandle};

/// A recommended movie with its distance from the query movie
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMovie {
    pub movie: MovieRecord,
    /// Smaller is more similar
    pub distance: f32,
}

/// Up to `n` movies most similar to `title`, nearest first, with distances.
///
/// The query movie never appears in its own results. When the catalog has
/// fewer than `n + 1` movies the result is shorter than `n`; that is not an
/// error.
///
/// # Errors
/// * `InvalidK` - `n == 0`
/// * `MovieNotFound` - `title` is not in the catalog (exact match)
pub fn recommend_scored(
    snapshot: &RecommenderSnapshot,
    title: &str,
    n: usize,
) -> Result<Vec<ScoredMovie>> {
    if n == 0 {
        return Err(RecommendError::InvalidK { n });
    }

    let catalog = snapshot.catalog();
    let record = catalog
        .get(title)
        .ok_or_else(|| RecommendError::MovieNotFound {
            title: title.to_string(),
        })?;

    let query = snapshot.encoder().encode(record);
    let k = (n + 1).min(snapshot.index().len());
    let mut hits = snapshot.index().query(&query, k)?;

    // Remove the first exact self-match only; a duplicate vector under
    // another title is a legitimate recommendation
    if let Some(own) = hits.iter().position(|hit| hit.key == title) {
        hits.remove(own);
    }
    hits.truncate(n);

    let recommendations = hits
        .into_iter()
        .filter_map(|hit| match catalog.get(&hit.key) {
            Some(movie) => Some(ScoredMovie {
                movie: movie.clone(),
                distance: hit.distance,
            }),
            None => {
                warn!("Index key {:?} has no catalog record", hit.key);
                None
            }
        })
        .collect();

    Ok(recommendations)
}

/// Same as [`recommend_scored`], records only
pub fn recommend(snapshot: &RecommenderSnapshot, title: &str, n: usize) -> Result<Vec<MovieRecord>> {
    Ok(recommend_scored(snapshot, title, n)?
        .into_iter()
        .map(|scored| scored.movie)
        .collect())
}

/// Thread-safe front end over a swappable snapshot.
///
/// Cloning is cheap: clones share the same `SnapshotHandle`, so a
/// `reload` through any clone is seen by all of them.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    snapshots: Arc<SnapshotHandle>,
}

impl RecommendationService {
    pub fn new(snapshot: RecommenderSnapshot) -> Self {
        Self::with_handle(Arc::new(SnapshotHandle::new(snapshot)))
    }

    /// Share an existing handle (e.g. one also used by a reload task)
    pub fn with_handle(snapshots: Arc<SnapshotHandle>) -> Self {
        Self { snapshots }
    }

    pub fn handle(&self) -> &Arc<SnapshotHandle> {
        &self.snapshots
    }

    /// Snapshot the next request will run against
    pub fn snapshot(&self) -> Arc<RecommenderSnapshot> {
        self.snapshots.current()
    }

    /// Swap in a new snapshot; in-flight requests finish on the old one
    pub fn reload(&self, snapshot: RecommenderSnapshot) {
        self.snapshots.replace(snapshot);
    }

    /// Up to `n` similar movies, nearest first
    pub fn recommend(&self, title: &str, n: usize) -> Result<Vec<MovieRecord>> {
        Ok(self
            .recommend_scored(title, n)?
            .into_iter()
            .map(|scored| scored.movie)
            .collect())
    }

    /// Up to the configured default count of similar movies
    pub fn recommend_default(&self, title: &str) -> Result<Vec<MovieRecord>> {
        let n = self.snapshot().config().default_count;
        self.recommend(title, n)
    }

    /// Up to `n` similar movies with their distances, nearest first
    #[instrument(skip(self))]
    pub fn recommend_scored(&self, title: &str, n: usize) -> Result<Vec<ScoredMovie>> {
        let start_time = Instant::now();
        let snapshot = self.snapshots.current();

        let result = recommend_scored(&snapshot, title, n);
        match &result {
            Ok(recommendations) => info!(
                "Recommended {} movies for {:?} in {:.2?}",
                recommendations.len(),
                title,
                start_time.elapsed()
            ),
            Err(e) => debug!("Recommendation for {:?} failed: {}", title, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommenderConfig;
    use data_loader::Catalog;
    use features::NumericScaling;
    use neighbors::DistanceMetric;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Two action movies with nearly the same numbers, and a romance that
    /// matches the first one's numbers exactly
    fn alpha_beta_gamma() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_records(vec![
                MovieRecord::new("Alpha", 8.0, 120)
                    .with_genres(["Action"])
                    .with_year(2010)
                    .with_votes(1000),
                MovieRecord::new("Beta", 7.9, 118)
                    .with_genres(["Action"])
                    .with_year(2011)
                    .with_votes(900),
                MovieRecord::new("Gamma", 8.0, 120)
                    .with_genres(["Romance"])
                    .with_year(2010)
                    .with_votes(1000),
            ])
            .unwrap(),
        )
    }

    fn service(catalog: Arc<Catalog>) -> RecommendationService {
        RecommendationService::new(
            RecommenderSnapshot::build(catalog, RecommenderConfig::default()).unwrap(),
        )
    }

    /// Every scaling and metric combination the recommender supports
    fn all_configs() -> Vec<RecommenderConfig> {
        let mut configs = vec![];
        for scaling in [NumericScaling::MinMax, NumericScaling::ZScore] {
            for metric in [DistanceMetric::Euclidean, DistanceMetric::Cosine] {
                configs.push(
                    RecommenderConfig::default()
                        .with_scaling(scaling)
                        .with_metric(metric),
                );
            }
        }
        configs
    }

    fn titles(movies: &[MovieRecord]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[test]
    fn test_genre_agreement_beats_identical_numbers() {
        let service = service(alpha_beta_gamma());

        let recommendations = service.recommend("Alpha", 1).unwrap();
        assert_eq!(titles(&recommendations), vec!["Beta"]);

        let scored = service.recommend_scored("Alpha", 2).unwrap();
        assert_eq!(scored[0].movie.title, "Beta");
        assert_eq!(scored[1].movie.title, "Gamma");
        assert!((scored[0].distance - 1.0).abs() < 1e-5);
        assert!((scored[1].distance - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_genre_agreement_wins_under_every_config() {
        for config in all_configs() {
            let snapshot = RecommenderSnapshot::build(alpha_beta_gamma(), config).unwrap();
            let scored = recommend_scored(&snapshot, "Alpha", 2).unwrap();

            let order: Vec<&str> = scored.iter().map(|s| s.movie.title.as_str()).collect();
            assert_eq!(order, vec!["Beta", "Gamma"], "{:?}", config);
            assert!(scored[0].distance < scored[1].distance, "{:?}", config);
        }
    }

    #[test]
    fn test_unknown_title() {
        let service = service(alpha_beta_gamma());
        let result = service.recommend("Unknown Title", 3);
        assert!(matches!(
            result,
            Err(RecommendError::MovieNotFound { ref title }) if title == "Unknown Title"
        ));
    }

    #[test]
    fn test_title_lookup_is_exact() {
        let service = service(alpha_beta_gamma());
        assert!(service.recommend("alpha", 1).is_err());
        assert!(service.recommend(" Alpha", 1).is_err());
    }

    #[test]
    fn test_zero_count_is_invalid() {
        let service = service(alpha_beta_gamma());
        let result = service.recommend("Alpha", 0);
        assert!(matches!(result, Err(RecommendError::InvalidK { n: 0 })));
        assert!(result.unwrap_err().is_recoverable());
    }

    #[test]
    fn test_count_larger_than_catalog() {
        let service = service(alpha_beta_gamma());
        let recommendations = service.recommend("Gamma", 50).unwrap();
        assert_eq!(recommendations.len(), 2);
        assert!(!titles(&recommendations).contains(&"Gamma"));
    }

    #[test]
    fn test_single_movie_catalog_gives_empty_result() {
        let catalog = Arc::new(
            Catalog::from_records(vec![MovieRecord::new("Solo", 7.0, 100).with_genres(["Drama"])])
                .unwrap(),
        );
        let service = service(catalog);
        assert!(service.recommend("Solo", 5).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_vector_under_other_title_is_kept() {
        let twin = |title: &str| {
            MovieRecord::new(title, 7.0, 100)
                .with_genres(["Drama"])
                .with_year(2000)
        };
        let catalog = Arc::new(
            Catalog::from_records(vec![
                twin("Original"),
                twin("Remake"),
                MovieRecord::new("Other", 5.0, 90).with_genres(["Horror"]),
            ])
            .unwrap(),
        );
        let service = service(catalog);

        let scored = service.recommend_scored("Remake", 1).unwrap();
        assert_eq!(scored[0].movie.title, "Original");
        assert_eq!(scored[0].distance, 0.0);
    }

    #[test]
    fn test_default_count_from_config() {
        let snapshot = RecommenderSnapshot::build(
            alpha_beta_gamma(),
            RecommenderConfig::default().with_default_count(1),
        )
        .unwrap();
        let service = RecommendationService::new(snapshot);
        assert_eq!(service.recommend_default("Alpha").unwrap().len(), 1);
    }

    #[test]
    fn test_cosine_metric_still_excludes_self() {
        let snapshot = RecommenderSnapshot::build(
            alpha_beta_gamma(),
            RecommenderConfig::default().with_metric(DistanceMetric::Cosine),
        )
        .unwrap();
        let scored = recommend_scored(&snapshot, "Beta", 2).unwrap();
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|s| s.movie.title != "Beta"));
        assert!(scored[0].distance <= scored[1].distance);
    }

    #[test]
    fn test_reload_switches_catalog() {
        let service = service(alpha_beta_gamma());
        assert!(service.recommend("Delta", 1).is_err());

        let mut records = alpha_beta_gamma().records().to_vec();
        records.push(
            MovieRecord::new("Delta", 6.0, 95)
                .with_genres(["Romance"])
                .with_year(2015),
        );
        let bigger = Arc::new(Catalog::from_records(records).unwrap());
        service.reload(RecommenderSnapshot::build(bigger, RecommenderConfig::default()).unwrap());

        let recommendations = service.recommend("Delta", 1).unwrap();
        assert_eq!(titles(&recommendations), vec!["Gamma"]);
    }

    #[test]
    fn test_concurrent_queries_agree() {
        let service = service(alpha_beta_gamma());
        let expected = service.recommend("Alpha", 2).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let service = service.clone();
                let expected = &expected;
                scope.spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(&service.recommend("Alpha", 2).unwrap(), expected);
                    }
                });
            }
        });
    }
}
