//! Unsupervised point-anomaly detection.

mod anomaly;
mod isolation_forest;

pub use anomaly::AnomalyDetector;
pub use isolation_forest::{IsolationForest, IsolationForestConfig};
