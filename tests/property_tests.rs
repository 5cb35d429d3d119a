//! Property-based tests for the normalization and forecasting invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use enercast::core::{DatasetKind, EnergySeries};
use enercast::features::build_lag_features;
use enercast::ingest::{normalize, RawTable};
use enercast::models::Forecaster;

fn hourly_series(values: &[f64]) -> EnergySeries {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let points: Vec<(DateTime<Utc>, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (base + Duration::hours(i as i64), v))
        .collect();
    EnergySeries::from_points(points)
}

/// Two-column wide household CSV with `rows` timestamped lines.
fn wide_csv(values: &[(f64, f64)]) -> String {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut csv = String::from("timestamp,fridge_kwh,hvac_kwh\n");
    for (i, (a, b)) in values.iter().enumerate() {
        let ts = base + Duration::hours(i as i64);
        csv.push_str(&format!("{},{a},{b}\n", ts.format("%Y-%m-%d %H:%M:%S")));
    }
    csv
}

proptest! {
    #[test]
    fn feature_rows_are_length_minus_lag_depth(
        values in prop::collection::vec(0.0..100.0_f64, 0..80),
        lag_depth in 1..30_usize,
    ) {
        let series = hourly_series(&values);
        let features = build_lag_features(&series, lag_depth).unwrap();

        prop_assert_eq!(features.len(), values.len().saturating_sub(lag_depth));
    }

    #[test]
    fn lag_one_always_matches_the_preceding_value(
        values in prop::collection::vec(0.0..100.0_f64, 5..60),
        lag_depth in 1..5_usize,
    ) {
        let series = hourly_series(&values);
        let features = build_lag_features(&series, lag_depth).unwrap();

        for (row_idx, row) in features.rows().iter().enumerate() {
            let target_position = row_idx + lag_depth;
            prop_assert_eq!(row[0], values[target_position - 1]);
            prop_assert_eq!(features.targets()[row_idx], values[target_position]);
        }
    }

    #[test]
    fn wide_normalization_doubles_the_row_count(
        values in prop::collection::vec((0.0..50.0_f64, 0.0..50.0_f64), 1..40),
    ) {
        let raw = RawTable::from_str(&wide_csv(&values)).unwrap();
        let table = normalize(&raw, DatasetKind::Household);

        prop_assert_eq!(table.len(), 2 * values.len());
        prop_assert_eq!(
            table.categories(),
            vec!["fridge".to_string(), "hvac".to_string()]
        );
    }

    #[test]
    fn forecast_horizon_and_spacing_hold(
        base_value in 1.0..50.0_f64,
        length in 30..60_usize,
        horizon in 1..20_usize,
    ) {
        let values = vec![base_value; length];
        let series = hourly_series(&values);

        let mut forecaster = Forecaster::new();
        forecaster.train(&series).unwrap();
        let points = forecaster.predict_next_n(&series, horizon).unwrap();

        prop_assert_eq!(points.len(), horizon);
        let last = series.last_timestamp().unwrap();
        prop_assert_eq!(points[0].timestamp, last + Duration::hours(1));
        for pair in points.windows(2) {
            prop_assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn fallback_normalization_is_all_zeros(
        rows in 1..30_usize,
    ) {
        let mut csv = String::from("timestamp,notes\n");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..rows {
            let ts = base + Duration::hours(i as i64);
            csv.push_str(&format!("{},x\n", ts.format("%Y-%m-%d %H:%M:%S")));
        }

        let raw = RawTable::from_str(&csv).unwrap();
        let table = normalize(&raw, DatasetKind::Household);

        prop_assert_eq!(table.len(), rows);
        prop_assert!(table.records().iter().all(|r| r.value == 0.0));
    }
}
