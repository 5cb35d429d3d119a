//! Per-category analysis fan-out over canonical tables.
//!
//! Categories are processed sequentially in first-appearance order, each
//! with its own freshly seeded model, so a future parallel fan-out could
//! not change any observable result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::core::{DatasetKind, EnergySeries, EnergyTable};
use crate::detection::{AnomalyDetector, IsolationForestConfig};
use crate::error::{EnergyError, Result};
use crate::models::{ForecastPoint, Forecaster};

/// Forecast for one category of an industrial table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForecast {
    pub category: String,
    pub r_squared: f64,
    pub points: Vec<ForecastPoint>,
}

/// Outcome of forecasting a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForecastReport {
    /// One forecast: a single unlabeled series, or a household table
    /// aggregated across its appliances.
    Single {
        r_squared: f64,
        points: Vec<ForecastPoint>,
    },
    /// Independent forecasts per energy type, in first-appearance order.
    PerCategory(Vec<CategoryForecast>),
}

/// A canonical observation with its anomaly flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: DateTime<Utc>,
    pub category: Option<String>,
    pub value: f64,
    pub anomaly: bool,
}

/// Forecast `horizon` hourly steps over a canonical table.
///
/// Household tables are summed across appliances per timestamp and yield
/// one aggregate forecast; industrial tables get one independent forecast
/// per energy type; tables without categories forecast their lone series.
pub fn forecast_table(
    table: &EnergyTable,
    horizon: usize,
    config: &Config,
) -> Result<ForecastReport> {
    if table.is_empty() {
        return Err(EnergyError::InsufficientData { needed: 1, got: 0 });
    }

    match (table.kind(), table.has_categories()) {
        (DatasetKind::Household, true) => {
            let (r_squared, points) = run_forecast(&table.aggregated_series(), horizon, config)?;
            Ok(ForecastReport::Single { r_squared, points })
        }
        (DatasetKind::Industrial, true) => {
            let mut results = Vec::new();
            for category in table.categories() {
                debug!(category = %category, "forecasting energy type");
                let (r_squared, points) =
                    run_forecast(&table.category_series(&category), horizon, config)?;
                results.push(CategoryForecast {
                    category,
                    r_squared,
                    points,
                });
            }
            Ok(ForecastReport::PerCategory(results))
        }
        _ => {
            let (r_squared, points) = run_forecast(&table.series(), horizon, config)?;
            Ok(ForecastReport::Single { r_squared, points })
        }
    }
}

fn run_forecast(
    series: &EnergySeries,
    horizon: usize,
    config: &Config,
) -> Result<(f64, Vec<ForecastPoint>)> {
    let mut forecaster = Forecaster::new()
        .with_lag_depth(config.lag_depth)
        .with_seed(config.random_seed);
    let r_squared = forecaster.train(series)?;
    let points = forecaster.predict_next_n(series, horizon)?;
    Ok((r_squared, points))
}

/// Flag anomalies across a canonical table, one detector per partition.
///
/// Each category is fit and scored independently with an identically
/// seeded detector; distributions are never pooled, so a spike in one
/// appliance cannot mask or create anomalies in another. Rows come back
/// per category in first-appearance order, timestamp-sorted within each,
/// NaN values dropped. The caller filters for flagged rows.
pub fn detect_table(table: &EnergyTable, config: &Config) -> Result<Vec<AnomalyRecord>> {
    if table.is_empty() {
        return Err(EnergyError::InsufficientData { needed: 1, got: 0 });
    }

    let forest_config = || {
        IsolationForestConfig::default()
            .contamination(config.contamination)
            .seed(config.random_seed)
    };

    let mut out = Vec::new();
    if table.has_categories() {
        for category in table.categories() {
            let series = table.category_series(&category);
            let mut detector = AnomalyDetector::with_config(forest_config());
            let flags = detector.fit_detect(&series)?;
            append_records(&mut out, &series, Some(&category), &flags);
        }
    } else {
        let series = table.series();
        let mut detector = AnomalyDetector::with_config(forest_config());
        let flags = detector.fit_detect(&series)?;
        append_records(&mut out, &series, None, &flags);
    }
    Ok(out)
}

fn append_records(
    out: &mut Vec<AnomalyRecord>,
    series: &EnergySeries,
    category: Option<&str>,
    flags: &[bool],
) {
    for i in 0..series.len() {
        out.push(AnomalyRecord {
            timestamp: series.timestamps()[i],
            category: category.map(|c| c.to_string()),
            value: series.values()[i],
            anomaly: flags[i],
        });
    }
}
