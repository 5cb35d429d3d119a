//! Single numeric series extracted from a canonical table.

use chrono::{DateTime, Utc};

/// One timestamp-ordered numeric series.
///
/// Construction sorts by timestamp (stable, so same-timestamp observations
/// keep their input order) and drops NaN values, which exist only
/// transiently in freshly normalized tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergySeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl EnergySeries {
    /// Build a series from (timestamp, value) observations.
    pub fn from_points(points: Vec<(DateTime<Utc>, f64)>) -> Self {
        let mut points: Vec<_> = points.into_iter().filter(|(_, v)| !v.is_nan()).collect();
        points.sort_by_key(|(t, _)| *t);

        let mut timestamps = Vec::with_capacity(points.len());
        let mut values = Vec::with_capacity(points.len());
        for (t, v) in points {
            timestamps.push(t);
            values.push(v);
        }
        Self { timestamps, values }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps, sorted ascending.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values, aligned with [`timestamps`](Self::timestamps).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Timestamp of the most recent observation.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Arithmetic mean of the values (NaN for an empty series).
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn from_points_sorts_by_timestamp() {
        let series = EnergySeries::from_points(vec![(ts(2), 3.0), (ts(0), 1.0), (ts(1), 2.0)]);

        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.timestamps(), &[ts(0), ts(1), ts(2)]);
        assert_eq!(series.last_timestamp(), Some(ts(2)));
    }

    #[test]
    fn from_points_drops_nan_values() {
        let series = EnergySeries::from_points(vec![(ts(0), 1.0), (ts(1), f64::NAN), (ts(2), 3.0)]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[1.0, 3.0]);
    }

    #[test]
    fn stable_sort_keeps_same_timestamp_order() {
        let series = EnergySeries::from_points(vec![(ts(1), 10.0), (ts(0), 5.0), (ts(1), 20.0)]);

        assert_eq!(series.values(), &[5.0, 10.0, 20.0]);
    }

    #[test]
    fn mean_of_values() {
        let series = EnergySeries::from_points(vec![(ts(0), 1.0), (ts(1), 3.0)]);
        assert!((series.mean() - 2.0).abs() < 1e-12);

        let empty = EnergySeries::default();
        assert!(empty.mean().is_nan());
        assert!(empty.is_empty());
        assert_eq!(empty.last_timestamp(), None);
    }
}
