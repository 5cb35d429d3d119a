//! Isolation forest over one numeric column.
//!
//! Points that random axis-aligned splits isolate in fewer partitions than
//! typical get high anomaly scores. The decision threshold is calibrated on
//! the training scores so that roughly `contamination` of the fitted points
//! fall above it.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{EnergyError, Result};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest hyperparameters.
#[derive(Debug, Clone)]
pub struct IsolationForestConfig {
    /// Number of isolation trees.
    pub n_estimators: usize,
    /// Per-tree subsample ceiling.
    pub max_samples: usize,
    /// Expected fraction of anomalous points, in (0, 1).
    pub contamination: f64,
    /// RNG seed; identical seeds give identical forests.
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.02,
            seed: 42,
        }
    }
}

impl IsolationForestConfig {
    /// Override the contamination prior.
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Override the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

enum Tree {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Tree>,
        right: Box<Tree>,
    },
}

/// Isolation forest fitted on one value column.
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<Tree>,
    subsample_size: usize,
    threshold: f64,
}

impl IsolationForest {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            subsample_size: 0,
            threshold: 0.0,
        }
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Build the forest and calibrate the contamination threshold.
    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        if !(0.0..1.0).contains(&self.config.contamination) || self.config.contamination == 0.0 {
            return Err(EnergyError::InvalidParameter(
                "contamination must be in (0, 1)".to_string(),
            ));
        }
        if self.config.n_estimators == 0 || self.config.max_samples == 0 {
            return Err(EnergyError::InvalidParameter(
                "n_estimators and max_samples must be positive".to_string(),
            ));
        }
        let n = values.len();
        if n == 0 {
            return Err(EnergyError::InsufficientData { needed: 1, got: 0 });
        }

        let psi = self.config.max_samples.min(n);
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for _ in 0..self.config.n_estimators {
            let sample: Vec<f64> = if psi == n {
                values.to_vec()
            } else {
                rand::seq::index::sample(&mut rng, n, psi)
                    .iter()
                    .map(|i| values[i])
                    .collect()
            };
            trees.push(grow(sample, 0, height_limit, &mut rng));
        }

        self.trees = trees;
        self.subsample_size = psi;

        let mut scores: Vec<f64> = values.iter().map(|&v| self.raw_score(v)).collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.threshold = quantile(&scores, 1.0 - self.config.contamination);
        Ok(())
    }

    /// Anomaly score in (0, 1]; higher means easier to isolate.
    pub fn score(&self, value: f64) -> Result<f64> {
        if !self.is_fitted() {
            return Err(EnergyError::TrainRequired);
        }
        Ok(self.raw_score(value))
    }

    /// Flag every value whose score exceeds the calibrated threshold.
    pub fn detect(&self, values: &[f64]) -> Result<Vec<bool>> {
        if !self.is_fitted() {
            return Err(EnergyError::TrainRequired);
        }
        Ok(values
            .iter()
            .map(|&v| self.raw_score(v) > self.threshold)
            .collect())
    }

    fn raw_score(&self, value: f64) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| path_length(tree, value, 0.0))
            .sum();
        let mean_path = total / self.trees.len() as f64;
        let normalizer = average_path_length(self.subsample_size);
        if normalizer <= 0.0 {
            return 1.0;
        }
        2.0_f64.powf(-mean_path / normalizer)
    }
}

fn grow(values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> Tree {
    if depth >= height_limit || values.len() <= 1 {
        return Tree::Leaf { size: values.len() };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > min) {
        // All values identical (or non-finite); nothing left to isolate.
        return Tree::Leaf { size: values.len() };
    }

    let threshold = min + rng.gen::<f64>() * (max - min);
    let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v < threshold);
    if left.is_empty() || right.is_empty() {
        let size = left.len() + right.len();
        return Tree::Leaf { size };
    }

    Tree::Split {
        threshold,
        left: Box::new(grow(left, depth + 1, height_limit, rng)),
        right: Box::new(grow(right, depth + 1, height_limit, rng)),
    }
}

fn path_length(tree: &Tree, value: f64, depth: f64) -> f64 {
    match tree {
        Tree::Leaf { size } => depth + average_path_length(*size),
        Tree::Split {
            threshold,
            left,
            right,
        } => {
            if value < *threshold {
                path_length(left, value, depth + 1.0)
            } else {
                path_length(right, value, depth + 1.0)
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let nf = n as f64;
            2.0 * ((nf - 1.0).ln() + EULER_GAMMA) - 2.0 * (nf - 1.0) / nf
        }
    }
}

/// Linear-interpolation quantile over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}
