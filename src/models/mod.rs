//! Regression models for short-horizon forecasting.

mod forecaster;
mod gradient_boost;
mod tree;

pub use forecaster::{ForecastPoint, Forecaster, DEFAULT_SEED, HOLDOUT_FRACTION};
pub use gradient_boost::{GradientBoostConfig, GradientBoostedRegressor};
pub use tree::RegressionTree;
