//! # enercast
//!
//! Energy consumption analytics core: normalizes arbitrary CSV-like tabular
//! input into a canonical long-form table, then provides short-horizon
//! forecasting and point-anomaly detection over the resulting series.
//!
//! The crate covers the computational core only. The HTTP layer, file
//! upload handling, the dashboard, and the recommendation text service are
//! external collaborators; the last one is consumed through the
//! [`advisor::TextCompletion`] trait, never implemented here.

pub mod advisor;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod features;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use error::{EnergyError, Result};

pub mod prelude {
    pub use crate::advisor::{summarize_for_advisor, MetricsSummary, RecommendationEngine};
    pub use crate::config::Config;
    pub use crate::core::{DatasetKind, EnergyRecord, EnergySeries, EnergyTable};
    pub use crate::detection::AnomalyDetector;
    pub use crate::error::{EnergyError, Result};
    pub use crate::ingest::{normalize, RawTable};
    pub use crate::models::Forecaster;
    pub use crate::pipeline::{detect_table, forecast_table, ForecastReport};
    pub use crate::storage::{ArtifactHandle, ArtifactStore};
}
