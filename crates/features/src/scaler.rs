//! Normalization of the numeric feature columns.
//!
//! Raw columns live on wildly different scales (rating 0-10, vote counts in
//! the millions). Without scaling, the largest column decides every distance
//! and genre agreement stops mattering. The scaler is fit once over the
//! whole catalog and its parameters are kept next to the vocabulary so
//! later encodes reuse them.

use crate::error::{EncoderError, Result};
use data_loader::MovieRecord;
use serde::{Deserialize, Serialize};

/// Number of numeric columns appended after the genre block
pub const NUMERIC_COLUMNS: usize = 4;

/// Names of the numeric columns, in vector order
pub const NUMERIC_COLUMN_NAMES: [&str; NUMERIC_COLUMNS] =
    ["rating", "runtime_minutes", "release_year", "log_vote_count"];

/// Spreads below this are treated as constant columns
const MIN_SPREAD: f64 = 1e-12;

/// Z-scores are clipped to `[-Z_CLIP, Z_CLIP]` before rescaling
const Z_CLIP: f64 = 3.0;

/// How numeric columns are brought to a comparable magnitude
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericScaling {
    /// `(x - min) / (max - min)`, values of the fitted catalog land in [0, 1]
    #[default]
    MinMax,
    /// `(x - mean) / std`, clipped to +-3 and divided by 6 so every column
    /// lands in [-0.5, 0.5] and spans at most 1, like min-max
    ZScore,
}

/// Fitted statistics of one numeric column
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

impl ColumnStats {
    /// Fit over the known values of a column; all-unknown columns get zeros
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.collect();
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Fitted numeric scaler.
///
/// Every scaled value is multiplied by `numeric_weight`. Both scalings keep
/// each column inside a range of width 1, so with the default weight of 0.5
/// the whole numeric block spans at most a Euclidean distance of 1.0, less
/// than swapping one genre for another (sqrt 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    scaling: NumericScaling,
    numeric_weight: f32,
    columns: [ColumnStats; NUMERIC_COLUMNS],
}

impl NumericScaler {
    /// Fit column statistics over a catalog
    pub fn fit(records: &[MovieRecord], scaling: NumericScaling, numeric_weight: f32) -> Result<Self> {
        if records.is_empty() {
            return Err(EncoderError::EmptyCatalog);
        }
        if !numeric_weight.is_finite() || numeric_weight < 0.0 {
            return Err(EncoderError::InvalidWeight(numeric_weight));
        }

        let raw: Vec<[Option<f64>; NUMERIC_COLUMNS]> = records.iter().map(raw_columns).collect();
        let columns: [ColumnStats; NUMERIC_COLUMNS] =
            std::array::from_fn(|col| ColumnStats::fit(raw.iter().filter_map(|row| row[col])));

        Ok(Self {
            scaling,
            numeric_weight,
            columns,
        })
    }

    /// Scaled numeric block for one record
    ///
    /// Unknown values (release year) are imputed with the fitted column mean.
    pub fn transform(&self, record: &MovieRecord) -> [f32; NUMERIC_COLUMNS] {
        let raw = raw_columns(record);
        std::array::from_fn(|col| {
            let stats = &self.columns[col];
            let value = raw[col].unwrap_or(stats.mean);
            let scaled = match self.scaling {
                NumericScaling::MinMax => {
                    let spread = stats.max - stats.min;
                    if spread < MIN_SPREAD {
                        0.0
                    } else {
                        (value - stats.min) / spread
                    }
                }
                NumericScaling::ZScore => {
                    if stats.std < MIN_SPREAD {
                        0.0
                    } else {
                        let z = (value - stats.mean) / stats.std;
                        z.clamp(-Z_CLIP, Z_CLIP) / (2.0 * Z_CLIP)
                    }
                }
            };
            (scaled * self.numeric_weight as f64) as f32
        })
    }

    pub fn scaling(&self) -> NumericScaling {
        self.scaling
    }

    pub fn numeric_weight(&self) -> f32 {
        self.numeric_weight
    }

    pub fn column(&self, index: usize) -> Option<&ColumnStats> {
        self.columns.get(index)
    }
}

/// Raw numeric columns of a record, before scaling
fn raw_columns(record: &MovieRecord) -> [Option<f64>; NUMERIC_COLUMNS] {
    [
        Some(record.rating as f64),
        Some(record.runtime_minutes as f64),
        record.release_year.map(|y| y as f64),
        // Vote counts are heavy-tailed; compress before scaling
        Some((record.vote_count as f64).ln_1p()),
    ]
}
