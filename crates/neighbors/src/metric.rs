//! Distance functions used by the neighbor index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Norms below this are treated as the zero vector
const MIN_NORM: f32 = 1e-12;

/// Distance between two feature vectors; smaller means more similar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Straight-line distance, `sqrt(sum((a_i - b_i)^2))`
    #[default]
    Euclidean,
    /// `1 - cos(a, b)`, in [0, 2]; a zero vector is at distance 1 from everything
    Cosine,
}

impl DistanceMetric {
    /// Distance between `a` and `b`
    ///
    /// `norm_a` and `norm_b` are only read by `Cosine`; the index precomputes
    /// them once per row.
    pub fn distance(&self, a: &[f32], b: &[f32], norm_a: f32, norm_b: f32) -> f32 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            DistanceMetric::Cosine => {
                if norm_a < MIN_NORM || norm_b < MIN_NORM {
                    return 1.0;
                }
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                // Clamp floating point drift (e.g. 1.0000001)
                1.0 - (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Euclidean norm of a vector
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
        metric.distance(a, b, norm(a), norm(b))
    }

    #[test]
    fn test_euclidean() {
        assert_eq!(distance(DistanceMetric::Euclidean, &[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(distance(DistanceMetric::Euclidean, &[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine() {
        let same = distance(DistanceMetric::Cosine, &[1.0, 1.0], &[2.0, 2.0]);
        let orthogonal = distance(DistanceMetric::Cosine, &[1.0, 0.0], &[0.0, 1.0]);
        let opposite = distance(DistanceMetric::Cosine, &[1.0, 0.0], &[-1.0, 0.0]);

        assert!(same.abs() < 1e-6);
        assert!((orthogonal - 1.0).abs() < 1e-6);
        assert!((opposite - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(distance(DistanceMetric::Cosine, &[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(DistanceMetric::Cosine.to_string(), "cosine");
        assert_eq!(DistanceMetric::default(), DistanceMetric::Euclidean);
    }
}
