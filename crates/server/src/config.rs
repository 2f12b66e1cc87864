//! Recommender configuration.
//!
//! Passed explicitly to `RecommenderSnapshot::build` and persisted inside
//! index artifacts; there is no global configuration state.

use crate::error::Result;
use features::{EncoderConfig, NumericScaling};
use neighbors::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Build-time and query-time knobs of the recommender
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Distance used by the neighbor index
    pub metric: DistanceMetric,
    /// How numeric columns are normalised
    pub scaling: NumericScaling,
    /// Multiplier applied to the scaled numeric block
    pub numeric_weight: f32,
    /// Recommendation count used when the caller does not give one
    pub default_count: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        let encoder = EncoderConfig::default();
        Self {
            metric: DistanceMetric::Euclidean,
            scaling: encoder.scaling,
            numeric_weight: encoder.numeric_weight,
            default_count: 10,
        }
    }
}

impl RecommenderConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_scaling(mut self, scaling: NumericScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_numeric_weight(mut self, weight: f32) -> Self {
        self.numeric_weight = weight;
        self
    }

    pub fn with_default_count(mut self, count: usize) -> Self {
        self.default_count = count;
        self
    }

    /// The subset of settings the feature encoder needs
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            scaling: self.scaling,
            numeric_weight: self.numeric_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RecommenderConfig::default();
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.scaling, NumericScaling::MinMax);
        assert_eq!(config.numeric_weight, 0.5);
        assert_eq!(config.default_count, 10);
    }

    #[test]
    fn test_builder() {
        let config = RecommenderConfig::default()
            .with_metric(DistanceMetric::Cosine)
            .with_scaling(NumericScaling::ZScore)
            .with_numeric_weight(0.25)
            .with_default_count(5);

        assert_eq!(config.encoder_config().scaling, NumericScaling::ZScore);
        assert_eq!(config.encoder_config().numeric_weight, 0.25);
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert_eq!(config.default_count, 5);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"metric": "cosine", "default_count": 3}}"#).unwrap();

        let config = RecommenderConfig::load(file.path()).unwrap();
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert_eq!(config.default_count, 3);
        assert_eq!(config.numeric_weight, 0.5);
    }
}
