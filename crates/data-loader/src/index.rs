//! Catalog building and indexing logic.
//!
//! This module builds the `Catalog` from parsed data:
//! - Clean raw rows (drop incomplete rows, drop duplicate titles)
//! - Create the primary title index
//! - Build secondary indices (genre_index, year_index)
//! - Compute catalog-wide summary statistics and distributions
//!
//! Rust concepts you'll learn:
//! - Building HashMaps and indices
//! - Iterator methods (map, filter, fold, etc.)
//! - Entry API for HashMap

use crate::error::{DataLoadError, Result};
use crate::parser::{self, RawMovieRow};
use crate::types::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

impl Catalog {
    /// Load and clean a catalog file
    ///
    /// This is the main entry point for loading data.
    ///
    /// Steps:
    /// 1. Parse the file into raw rows
    /// 2. Clean the rows (see `Catalog::from_raw_rows`)
    /// 3. Build primary and secondary indices
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading movie catalog from {:?}", path);

        let rows = parser::parse_catalog(path)?;
        let (catalog, report) = Self::from_raw_rows(rows)?;

        info!(
            "Loaded {} movies ({} rows read, {} dropped)",
            catalog.len(),
            report.rows_read,
            report.dropped()
        );
        Ok(catalog)
    }

    /// Clean raw rows and build a catalog from the survivors.
    ///
    /// A row is dropped when:
    /// - rating or runtime is missing
    /// - rating or runtime is not positive
    /// - rating is above `MAX_RATING`
    /// - an earlier row already used the same title
    pub fn from_raw_rows(rows: Vec<RawMovieRow>) -> Result<(Self, CleaningReport)> {
        let mut report = CleaningReport {
            rows_read: rows.len(),
            ..CleaningReport::default()
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let (rating, runtime) = match (row.rating, row.runtime) {
                (Some(rating), Some(runtime)) => (rating, runtime),
                _ => {
                    debug!("Line {}: missing rating or runtime, dropped", row.line);
                    report.missing_required += 1;
                    continue;
                }
            };
            if rating <= 0.0 || runtime <= 0.0 {
                debug!(
                    "Line {}: non-positive rating {} or runtime {}, dropped",
                    row.line, rating, runtime
                );
                report.non_positive += 1;
                continue;
            }
            if rating > MAX_RATING {
                debug!("Line {}: rating {} out of range, dropped", row.line, rating);
                report.out_of_range += 1;
                continue;
            }
            if !seen.insert(row.title.clone()) {
                debug!("Line {}: duplicate title {:?}, dropped", row.line, row.title);
                report.duplicate_titles += 1;
                continue;
            }

            records.push(MovieRecord {
                title: row.title,
                genres: row.genres,
                rating,
                runtime_minutes: runtime.round() as u32,
                release_year: row.year,
                vote_count: row.votes.map(|v| v.round() as u64).unwrap_or(0),
                language: row.language,
            });
        }

        if report.duplicate_titles > 0 {
            warn!(
                "Dropped {} rows with duplicate titles (kept first occurrence)",
                report.duplicate_titles
            );
        }

        let catalog = Self::from_records(records)?;
        Ok((catalog, report))
    }

    /// Build a catalog from already-clean records.
    ///
    /// This is the strict constructor: it does not drop anything, it rejects.
    /// Fails on duplicate titles and on ratings outside 0-10.
    pub fn from_records(records: Vec<MovieRecord>) -> Result<Self> {
        let mut by_title = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            if !record.rating.is_finite() || record.rating < 0.0 || record.rating > MAX_RATING {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: record.rating.to_string(),
                });
            }
            if by_title.insert(record.title.clone(), position).is_some() {
                return Err(DataLoadError::DuplicateTitle {
                    title: record.title.clone(),
                });
            }
        }

        let mut catalog = Catalog {
            records,
            by_title,
            ..Catalog::default()
        };
        catalog.build_secondary_indices();
        Ok(catalog)
    }

    /// Build secondary indices after primary data is loaded
    ///
    /// This creates the genre_index and year_index for browsing queries
    fn build_secondary_indices(&mut self) {
        for (position, record) in self.records.iter().enumerate() {
            // Index by genres
            for genre in &record.genres {
                self.genre_index
                    .entry(genre.clone())
                    .or_default()
                    .push(position);
            }

            // Index by release year (only if year is known)
            if let Some(year) = record.release_year {
                self.year_index.entry(year).or_default().push(position);
            }
        }
    }

    /// Compute the dashboard KPIs for the whole catalog
    pub fn summary(&self) -> CatalogSummary {
        let total_movies = self.records.len();
        let average_rating = if total_movies > 0 {
            let total: f64 = self.records.iter().map(|r| r.rating as f64).sum();
            (total / total_movies as f64) as f32
        } else {
            0.0
        };
        let total_minutes: u64 = self.records.iter().map(|r| r.runtime_minutes as u64).sum();

        let year_range = match (
            self.year_index.keys().next(),
            self.year_index.keys().next_back(),
        ) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        };

        CatalogSummary {
            total_movies,
            average_rating,
            total_runtime_hours: total_minutes / 60,
            distinct_genres: self.genre_index.len(),
            year_range,
        }
    }

    /// Movie counts per equal-width rating bin over `0..=MAX_RATING`.
    ///
    /// A rating of exactly `MAX_RATING` falls in the last bin. Zero bins
    /// yields an empty histogram.
    pub fn rating_histogram(&self, bins: usize) -> Vec<usize> {
        let mut histogram = vec![0; bins];
        if bins == 0 {
            return histogram;
        }
        for record in &self.records {
            let bin = ((record.rating / MAX_RATING) * bins as f32) as usize;
            histogram[bin.min(bins - 1)] += 1;
        }
        histogram
    }

    /// Movie counts keyed by decade (1990 for 1990-1999); unknown years are skipped
    pub fn movies_per_decade(&self) -> BTreeMap<u16, usize> {
        let mut decades = BTreeMap::new();
        for (year, positions) in &self.year_index {
            *decades.entry(year / 10 * 10).or_insert(0) += positions.len();
        }
        decades
    }
}
