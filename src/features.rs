//! Lagged-feature construction for model training.

use chrono::Timelike;

use crate::core::EnergySeries;
use crate::error::{EnergyError, Result};

/// Default number of preceding hourly observations used as features.
pub const DEFAULT_LAG_DEPTH: usize = 24;

/// Fixed-width training table derived from one series.
///
/// Each row is `[lag_1, ..., lag_L, hour]` with `lag_1` the most recent
/// preceding value and `hour` the target timestamp's hour of day. Only
/// positions with a full lag history produce rows, so a series of length M
/// yields exactly `max(0, M - L)` of them.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    lag_depth: usize,
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl FeatureMatrix {
    /// Number of feature rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no position had a full lag history.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Configured lag depth L.
    pub fn lag_depth(&self) -> usize {
        self.lag_depth
    }

    /// Number of columns per row (L lags plus the hour).
    pub fn feature_width(&self) -> usize {
        self.lag_depth + 1
    }

    /// Feature rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Target values, aligned with [`rows`](Self::rows).
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }
}

/// Build the lagged feature table for a series.
///
/// The series is already timestamp-sorted by construction. The first L
/// positions lack full lag history and never appear in the output.
pub fn build_lag_features(series: &EnergySeries, lag_depth: usize) -> Result<FeatureMatrix> {
    if lag_depth == 0 {
        return Err(EnergyError::InvalidParameter(
            "lag depth must be positive".to_string(),
        ));
    }

    let values = series.values();
    let timestamps = series.timestamps();
    let mut rows = Vec::new();
    let mut targets = Vec::new();

    for i in lag_depth..values.len() {
        let mut row = Vec::with_capacity(lag_depth + 1);
        for k in 1..=lag_depth {
            row.push(values[i - k]);
        }
        row.push(timestamps[i].hour() as f64);
        rows.push(row);
        targets.push(values[i]);
    }

    Ok(FeatureMatrix {
        lag_depth,
        rows,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn hourly_series(values: &[f64]) -> EnergySeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points: Vec<(DateTime<Utc>, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (base + Duration::hours(i as i64), v))
            .collect();
        EnergySeries::from_points(points)
    }

    #[test]
    fn row_count_is_length_minus_lag_depth() {
        let series = hourly_series(&(0..30).map(|i| i as f64).collect::<Vec<_>>());
        let features = build_lag_features(&series, 24).unwrap();

        assert_eq!(features.len(), 6);
        assert_eq!(features.lag_depth(), 24);
        assert_eq!(features.feature_width(), 25);
    }

    #[test]
    fn short_series_yields_no_rows() {
        let series = hourly_series(&[1.0, 2.0, 3.0]);
        let features = build_lag_features(&series, 24).unwrap();

        assert!(features.is_empty());
    }

    #[test]
    fn lag_one_is_the_immediately_preceding_value() {
        let series = hourly_series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let features = build_lag_features(&series, 2).unwrap();

        assert_eq!(features.len(), 3);
        // First eligible row targets value 30.0; lag_1 = 20.0, lag_2 = 10.0.
        assert_eq!(features.targets()[0], 30.0);
        assert_eq!(features.rows()[0][0], 20.0);
        assert_eq!(features.rows()[0][1], 10.0);
    }

    #[test]
    fn hour_feature_tracks_target_timestamp() {
        let series = hourly_series(&[1.0; 30]);
        let features = build_lag_features(&series, 24).unwrap();

        // First eligible target sits at hour 24 of the sequence, i.e. 00:00
        // the next day.
        assert_eq!(features.rows()[0][24], 0.0);
        assert_eq!(features.rows()[1][24], 1.0);
    }

    #[test]
    fn zero_lag_depth_is_invalid() {
        let series = hourly_series(&[1.0, 2.0]);
        assert!(matches!(
            build_lag_features(&series, 0),
            Err(EnergyError::InvalidParameter(_))
        ));
    }
}
