//! Per-series anomaly detector built on the isolation forest.

use tracing::debug;

use crate::core::EnergySeries;
use crate::detection::{IsolationForest, IsolationForestConfig};
use crate::error::Result;

/// Point-anomaly detector for one energy series.
///
/// Wraps an [`IsolationForest`] with the pipeline defaults (2% contamination,
/// fixed seed). One detector covers one partition: callers fitting multiple
/// appliances or energy types create a fresh, identically-seeded detector
/// per partition so scores and thresholds are never pooled across them.
pub struct AnomalyDetector {
    forest: IsolationForest,
}

impl AnomalyDetector {
    /// Detector with the default configuration.
    pub fn new() -> Self {
        Self::with_config(IsolationForestConfig::default())
    }

    /// Detector with an explicit configuration.
    pub fn with_config(config: IsolationForestConfig) -> Self {
        Self {
            forest: IsolationForest::new(config),
        }
    }

    /// Fit the detector on one series' values.
    pub fn fit(&mut self, series: &EnergySeries) -> Result<()> {
        self.forest.fit(series.values())
    }

    /// Score a series against the fitted model, one flag per observation.
    pub fn detect(&self, series: &EnergySeries) -> Result<Vec<bool>> {
        let flags = self.forest.detect(series.values())?;
        debug!(
            flagged = flags.iter().filter(|&&f| f).count(),
            total = flags.len(),
            "anomaly detection complete"
        );
        Ok(flags)
    }

    /// Fit and score the same series in one call.
    pub fn fit_detect(&mut self, series: &EnergySeries) -> Result<Vec<bool>> {
        self.fit(series)?;
        self.detect(series)
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}
