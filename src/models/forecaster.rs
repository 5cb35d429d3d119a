//! Lag-feature forecaster with recursive multi-step prediction.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::EnergySeries;
use crate::error::{EnergyError, Result};
use crate::features::{build_lag_features, DEFAULT_LAG_DEPTH};
use crate::models::{GradientBoostConfig, GradientBoostedRegressor};

/// Seed for the holdout shuffle, matching the detector's default.
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of feature rows held out for the training-quality score.
pub const HOLDOUT_FRACTION: f64 = 0.2;

/// One predicted observation, strictly hourly after the last input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted: f64,
}

/// Short-horizon forecaster over one energy series.
///
/// Training builds the lag-feature table, shuffles it with a fixed seed,
/// holds 20% out and reports R² on that holdout. The shuffled (rather than
/// time-ordered) split leaks future information into training; it is kept
/// deliberately as the established training-quality signal of this
/// pipeline and must stay reproducible.
///
/// Prediction is recursive: each step's output joins the lag buffer for the
/// next step. Forecast timestamps advance in whole hours from the last
/// observation; feeding a non-hourly series produces semantically wrong
/// timestamps (known limitation, not detected here).
pub struct Forecaster {
    lag_depth: usize,
    seed: u64,
    model: GradientBoostedRegressor,
}

impl Forecaster {
    /// Forecaster with the default lag depth of 24 hours.
    pub fn new() -> Self {
        Self {
            lag_depth: DEFAULT_LAG_DEPTH,
            seed: DEFAULT_SEED,
            model: GradientBoostedRegressor::new(GradientBoostConfig::default()),
        }
    }

    /// Override the lag depth.
    pub fn with_lag_depth(mut self, lag_depth: usize) -> Self {
        self.lag_depth = lag_depth;
        self
    }

    /// Override the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Configured lag depth.
    pub fn lag_depth(&self) -> usize {
        self.lag_depth
    }

    /// Whether `train` has completed.
    pub fn is_trained(&self) -> bool {
        self.model.is_fitted()
    }

    /// Train on a series and return R² on the shuffled 20% holdout.
    ///
    /// The score may be negative when the model underperforms a constant
    /// predictor.
    pub fn train(&mut self, series: &EnergySeries) -> Result<f64> {
        let features = build_lag_features(series, self.lag_depth)?;
        if features.is_empty() {
            return Err(EnergyError::InsufficientData {
                needed: self.lag_depth + 1,
                got: series.len(),
            });
        }

        let (train_idx, test_idx) = holdout_split(features.len(), self.seed)?;

        let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| features.rows()[i].clone()).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| features.targets()[i]).collect();
        let test_rows: Vec<Vec<f64>> = test_idx.iter().map(|&i| features.rows()[i].clone()).collect();
        let test_targets: Vec<f64> = test_idx.iter().map(|&i| features.targets()[i]).collect();

        self.model.fit(&train_rows, &train_targets)?;
        let score = self.model.score(&test_rows, &test_targets)?;
        info!(r_squared = score, rows = features.len(), "forecaster trained");
        Ok(score)
    }

    /// Recursively predict the next `n_steps` hourly values.
    pub fn predict_next_n(
        &self,
        series: &EnergySeries,
        n_steps: usize,
    ) -> Result<Vec<ForecastPoint>> {
        if !self.is_trained() {
            return Err(EnergyError::TrainRequired);
        }
        let last_timestamp = series
            .last_timestamp()
            .ok_or(EnergyError::InsufficientData { needed: 1, got: 0 })?;

        let mut buffer = series.values().to_vec();
        let mut points = Vec::with_capacity(n_steps);

        for step in 0..n_steps {
            let timestamp = last_timestamp + Duration::hours(step as i64 + 1);
            let row = self.feature_row(&buffer, timestamp);
            let predicted = self.model.predict(&row)?;
            points.push(ForecastPoint {
                timestamp,
                predicted,
            });
            buffer.push(predicted);
        }
        Ok(points)
    }

    /// One prediction row: `[lag_1..lag_L, hour]` with lag_1 the most
    /// recent buffer value and deep lags padded with the buffer mean when
    /// the history is shorter than the lag depth.
    fn feature_row(&self, buffer: &[f64], timestamp: DateTime<Utc>) -> Vec<f64> {
        let mean = buffer.iter().sum::<f64>() / buffer.len() as f64;
        let mut row = Vec::with_capacity(self.lag_depth + 1);
        for k in 1..=self.lag_depth {
            row.push(if k <= buffer.len() {
                buffer[buffer.len() - k]
            } else {
                mean
            });
        }
        row.push(timestamp.hour() as f64);
        row
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeded-shuffle 80/20 split over row indices.
fn holdout_split(n: usize, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * HOLDOUT_FRACTION).ceil() as usize;
    let n_test = n_test.clamp(1, n);
    if n_test == n {
        // Nothing left to train on.
        return Err(EnergyError::InsufficientData { needed: 2, got: n });
    }

    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    Ok((train, test))
}
