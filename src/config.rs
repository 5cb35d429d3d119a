//! Pipeline configuration with environment overrides.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::features::DEFAULT_LAG_DEPTH;

/// Which recommendation engine serves advisor requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisorBackend {
    /// Local rule-based generator.
    #[default]
    Heuristic,
    /// External text-completion service, supplied by the caller.
    External,
}

/// Tunable parameters shared by the analysis entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root directory for persisted canonical tables.
    pub upload_dir: PathBuf,
    /// Seed for every stochastic step (holdout shuffle, isolation forest).
    pub random_seed: u64,
    /// Number of hourly lags used as forecast features.
    pub lag_depth: usize,
    /// Expected anomalous fraction for the detector.
    pub contamination: f64,
    /// Recommendation engine selection.
    pub advisor_backend: AdvisorBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            random_seed: 42,
            lag_depth: DEFAULT_LAG_DEPTH,
            contamination: 0.02,
            advisor_backend: AdvisorBackend::Heuristic,
        }
    }
}

impl Config {
    /// Defaults overridden by `ENERCAST_*` environment variables.
    ///
    /// Unparseable values keep the default and log a warning; a missing
    /// variable is not an error.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("ENERCAST_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(seed) = parsed_var("ENERCAST_RANDOM_SEED") {
            config.random_seed = seed;
        }
        if let Some(lag) = parsed_var("ENERCAST_LAG_DEPTH") {
            config.lag_depth = lag;
        }
        if let Some(contamination) = parsed_var("ENERCAST_CONTAMINATION") {
            config.contamination = contamination;
        }
        if let Ok(backend) = env::var("ENERCAST_ADVISOR") {
            match backend.to_ascii_lowercase().as_str() {
                "heuristic" => config.advisor_backend = AdvisorBackend::Heuristic,
                "external" => config.advisor_backend = AdvisorBackend::External,
                other => warn!(value = other, "unknown ENERCAST_ADVISOR, keeping default"),
            }
        }

        config
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "unparseable override, keeping default");
            None
        }
    }
}
