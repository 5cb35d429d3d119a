//! Least-squares gradient boosting over regression trees.

use crate::error::{EnergyError, Result};
use crate::models::RegressionTree;

/// Ensemble hyperparameters.
#[derive(Debug, Clone)]
pub struct GradientBoostConfig {
    /// Number of boosting stages.
    pub n_estimators: usize,
    /// Shrinkage applied to each stage's contribution.
    pub learning_rate: f64,
    /// Depth limit of each base tree.
    pub max_depth: usize,
}

impl Default for GradientBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
        }
    }
}

/// Gradient-boosted regression tree ensemble.
///
/// For squared-error loss the negative gradient is the residual, so each
/// stage fits a tree to the current residuals and shrinks its contribution
/// by the learning rate. The model starts from the target mean. Fitting is
/// fully deterministic for a given input.
pub struct GradientBoostedRegressor {
    config: GradientBoostConfig,
    baseline: Option<f64>,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn new(config: GradientBoostConfig) -> Self {
        Self {
            config,
            baseline: None,
            trees: Vec::new(),
        }
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        self.baseline.is_some()
    }

    /// Fit the ensemble on feature rows and targets.
    pub fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if rows.is_empty() {
            return Err(EnergyError::InsufficientData { needed: 1, got: 0 });
        }
        if rows.len() != targets.len() {
            return Err(EnergyError::InvalidParameter(format!(
                "feature/target length mismatch: {} vs {}",
                rows.len(),
                targets.len()
            )));
        }

        let baseline = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut predictions = vec![baseline; targets.len()];
        let mut residuals = vec![0.0; targets.len()];
        self.trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            for i in 0..targets.len() {
                residuals[i] = targets[i] - predictions[i];
            }
            let tree = RegressionTree::fit(rows, &residuals, self.config.max_depth);
            for (i, row) in rows.iter().enumerate() {
                predictions[i] += self.config.learning_rate * tree.predict(row);
            }
            self.trees.push(tree);
        }

        self.baseline = Some(baseline);
        Ok(())
    }

    /// Predict one feature row.
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        let baseline = self.baseline.ok_or(EnergyError::TrainRequired)?;
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(baseline + self.config.learning_rate * boost)
    }

    /// Predict a batch of feature rows.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Coefficient of determination against held-out targets.
    ///
    /// May be negative when the model underperforms a constant predictor;
    /// a zero total sum of squares scores 1.0.
    pub fn score(&self, rows: &[Vec<f64>], targets: &[f64]) -> Result<f64> {
        if targets.is_empty() {
            return Err(EnergyError::InsufficientData { needed: 1, got: 0 });
        }
        let predicted = self.predict_batch(rows)?;

        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();
        let ss_res: f64 = targets
            .iter()
            .zip(predicted.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();

        if ss_tot == 0.0 {
            Ok(1.0)
        } else {
            Ok(1.0 - ss_res / ss_tot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fit_default(rows: &[Vec<f64>], targets: &[f64]) -> GradientBoostedRegressor {
        let mut model = GradientBoostedRegressor::new(GradientBoostConfig::default());
        model.fit(rows, targets).unwrap();
        model
    }

    #[test]
    fn constant_target_is_reproduced_exactly() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets = vec![3.5; 20];
        let model = fit_default(&rows, &targets);

        // Baseline equals the mean; every stage fits zero residuals.
        assert_relative_eq!(model.predict(&[7.0]).unwrap(), 3.5);
        assert_relative_eq!(model.score(&rows, &targets).unwrap(), 1.0);
    }

    #[test]
    fn learns_a_step_function() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 1.0 } else { 9.0 }).collect();
        let model = fit_default(&rows, &targets);

        assert!((model.predict(&[5.0]).unwrap() - 1.0).abs() < 0.1);
        assert!((model.predict(&[35.0]).unwrap() - 9.0).abs() < 0.1);
        assert!(model.score(&rows, &targets).unwrap() > 0.99);
    }

    #[test]
    fn fits_a_linear_trend_within_range() {
        let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..100).map(|i| 2.0 * i as f64).collect();
        let model = fit_default(&rows, &targets);

        assert!(model.score(&rows, &targets).unwrap() > 0.95);
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let model = GradientBoostedRegressor::new(GradientBoostConfig::default());
        assert!(matches!(
            model.predict(&[1.0]),
            Err(EnergyError::TrainRequired)
        ));
    }

    #[test]
    fn empty_fit_is_an_error() {
        let mut model = GradientBoostedRegressor::new(GradientBoostConfig::default());
        assert!(matches!(
            model.fit(&[], &[]),
            Err(EnergyError::InsufficientData { .. })
        ));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut model = GradientBoostedRegressor::new(GradientBoostConfig::default());
        let rows = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            model.fit(&rows, &[1.0]),
            Err(EnergyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn fitting_is_deterministic() {
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![(i % 7) as f64, i as f64]).collect();
        let targets: Vec<f64> = (0..50).map(|i| ((i * 13) % 17) as f64).collect();

        let a = fit_default(&rows, &targets);
        let b = fit_default(&rows, &targets);
        for i in 0..50 {
            assert_relative_eq!(
                a.predict(&rows[i]).unwrap(),
                b.predict(&rows[i]).unwrap()
            );
        }
    }
}
