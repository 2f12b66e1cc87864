//! Filter on runtime bands.
//!
//! The bands mirror the duration picker of the browsing UI:
//! short (< 90 min), medium (90-120), long (121-150), very long (> 150).

use crate::traits::Filter;
use anyhow::Result;
use data_loader::MovieRecord;

/// Runtime bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeBand {
    /// Under 90 minutes
    Short,
    /// 90 to 120 minutes, inclusive
    Medium,
    /// 121 to 150 minutes
    Long,
    /// Over 150 minutes
    VeryLong,
}

impl RuntimeBand {
    /// Whether a runtime (in minutes) falls into this band
    pub fn contains(&self, minutes: u32) -> bool {
        match self {
            RuntimeBand::Short => minutes < 90,
            RuntimeBand::Medium => (90..=120).contains(&minutes),
            RuntimeBand::Long => (121..=150).contains(&minutes),
            RuntimeBand::VeryLong => minutes > 150,
        }
    }

    /// Band a runtime belongs to; every runtime belongs to exactly one
    pub fn of(minutes: u32) -> Self {
        match minutes {
            0..=89 => RuntimeBand::Short,
            90..=120 => RuntimeBand::Medium,
            121..=150 => RuntimeBand::Long,
            _ => RuntimeBand::VeryLong,
        }
    }
}

/// Keeps movies whose runtime falls in a band.
pub struct RuntimeFilter {
    band: RuntimeBand,
}

impl RuntimeFilter {
    pub fn new(band: RuntimeBand) -> Self {
        Self { band }
    }
}

impl Filter for RuntimeFilter {
    fn name(&self) -> &str {
        "RuntimeFilter"
    }

    fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Result<Vec<&'a MovieRecord>> {
        Ok(movies
            .into_iter()
            .filter(|movie| self.band.contains(movie.runtime_minutes))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert!(RuntimeBand::Short.contains(89));
        assert!(RuntimeBand::Medium.contains(90));
        assert!(RuntimeBand::Medium.contains(120));
        assert!(RuntimeBand::Long.contains(121));
        assert!(RuntimeBand::Long.contains(150));
        assert!(RuntimeBand::VeryLong.contains(151));
    }

    #[test]
    fn test_every_runtime_has_one_band() {
        let bands = [
            RuntimeBand::Short,
            RuntimeBand::Medium,
            RuntimeBand::Long,
            RuntimeBand::VeryLong,
        ];
        for minutes in 0..300 {
            let matching: Vec<_> = bands.iter().filter(|b| b.contains(minutes)).collect();
            assert_eq!(matching.len(), 1, "runtime {}", minutes);
            assert_eq!(*matching[0], RuntimeBand::of(minutes));
        }
    }

    #[test]
    fn test_runtime_filter() {
        let short = MovieRecord::new("Short", 7.0, 85);
        let epic = MovieRecord::new("Epic", 7.0, 201);

        let filtered = RuntimeFilter::new(RuntimeBand::VeryLong)
            .apply(vec![&short, &epic])
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Epic");
    }
}
