//! Gradient-boosted binary classifier.
//!
//! High-level wrapper around [`Forest`] that remembers the feature names it
//! was trained on and the configuration used.

use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;
use crate::data::FeatureMatrix;
use crate::repr::Forest;
use crate::training::{GBDTTrainer, LogisticLoss, TrainError};
use crate::utils::{run_with_threads, Parallelism};

/// Predicted probabilities above this are the positive class.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Features handed to a trained model do not match its training features.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    #[error("model expects {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("feature {index}: model expects {expected:?}, got {got:?}")]
    FeatureNameMismatch {
        index: usize,
        expected: String,
        got: String,
    },
}

/// Trained binary classifier over named features.
///
/// # Example
///
/// ```
/// use boxboost::data::FeatureMatrix;
/// use boxboost::model::{BinaryClassifier, ClassifierConfig};
/// use ndarray::Array2;
///
/// let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f32);
/// let y: Vec<f32> = (0..20).map(|i| (i >= 10) as u8 as f32).collect();
/// let features = FeatureMatrix::new(vec!["area".into()], x);
///
/// let config = ClassifierConfig::builder().n_trees(5).scale_pos_weight(1.0).build().unwrap();
/// let model = BinaryClassifier::train(&features, &y, &config).unwrap();
/// assert_eq!(model.predict(&features).unwrap()[0], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryClassifier {
    forest: Forest,
    feature_names: Vec<String>,
    config: ClassifierConfig,
}

impl BinaryClassifier {
    /// Train on `features` with `{0, 1}` labels.
    pub fn train(
        features: &FeatureMatrix,
        labels: &[f32],
        config: &ClassifierConfig,
    ) -> Result<Self, TrainError> {
        let trainer = GBDTTrainer::new(config.objective(), config.to_gbdt_params());
        let forest = run_with_threads(config.thread_count(), |parallelism| {
            trainer.train(features.view(), labels, parallelism)
        })??;

        Ok(Self {
            forest,
            feature_names: features.feature_names().to_vec(),
            config: config.clone(),
        })
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Log-odds of the positive class for every row.
    pub fn predict_margin(&self, features: &FeatureMatrix) -> Result<Vec<f32>, PredictError> {
        self.check_features(features)?;
        Ok(self.forest.predict_margin(features.view(), Parallelism::Parallel))
    }

    /// Probability of the positive class for every row.
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f32>, PredictError> {
        let mut margins = self.predict_margin(features)?;
        margins.iter_mut().for_each(|m| *m = LogisticLoss::sigmoid(*m));
        Ok(margins)
    }

    /// Hard `{0, 1}` predictions.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f32>, PredictError> {
        let proba = self.predict_proba(features)?;
        Ok(proba
            .into_iter()
            .map(|p| if p > DECISION_THRESHOLD { 1.0 } else { 0.0 })
            .collect())
    }

    /// Probability for one row given in training feature order.
    pub fn predict_proba_row(&self, features: &[f32]) -> Result<f32, PredictError> {
        if features.len() != self.n_features() {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.n_features(),
                got: features.len(),
            });
        }
        Ok(LogisticLoss::sigmoid(self.forest.predict_margin_row(features)))
    }

    fn check_features(&self, features: &FeatureMatrix) -> Result<(), PredictError> {
        let got = features.feature_names();
        if got.len() != self.feature_names.len() {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                got: got.len(),
            });
        }
        match self.feature_names.iter().zip(got).position(|(a, b)| a != b) {
            Some(index) => Err(PredictError::FeatureNameMismatch {
                index,
                expected: self.feature_names[index].clone(),
                got: got[index].clone(),
            }),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Feature Importance
    // =========================================================================

    /// Number of splits on each feature, in feature order.
    pub fn feature_importance(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_features()];
        for tree in self.forest.trees() {
            for (_, feature) in tree.splits() {
                if let Some(c) = counts.get_mut(feature as usize) {
                    *c += 1;
                }
            }
        }
        counts
    }

    /// Split counts paired with feature names, most used first.
    pub fn ranked_features(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .feature_names
            .iter()
            .map(String::as_str)
            .zip(self.feature_importance())
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::threshold_features;

    fn small_config() -> ClassifierConfig {
        ClassifierConfig::builder()
            .n_trees(10)
            .scale_pos_weight(1.0)
            .n_threads(std::num::NonZeroUsize::MIN)
            .build()
            .unwrap()
    }

    #[test]
    fn learns_the_informative_feature() {
        let (x, y) = threshold_features(60);
        let model = BinaryClassifier::train(&x, &y, &small_config()).unwrap();

        assert_eq!(model.n_trees(), 10);
        assert_eq!(model.predict(&x).unwrap(), y);
        assert_eq!(model.ranked_features()[0].0, "signal");
        assert_eq!(model.feature_importance().len(), 2);
    }

    #[test]
    fn probabilities_are_open_unit_interval() {
        let (x, y) = threshold_features(30);
        let model = BinaryClassifier::train(&x, &y, &small_config()).unwrap();
        for p in model.predict_proba(&x).unwrap() {
            assert!(p > 0.0 && p < 1.0);
        }
    }

    #[test]
    fn row_and_batch_agree() {
        let (x, y) = threshold_features(30);
        let model = BinaryClassifier::train(&x, &y, &small_config()).unwrap();
        let batch = model.predict_proba(&x).unwrap();
        let row = model.predict_proba_row(&x.row(7).to_vec()).unwrap();
        assert_eq!(batch[7], row);
        assert!(matches!(model.predict_proba_row(&[1.0]), Err(PredictError::FeatureCountMismatch { .. })));
    }

    #[test]
    fn rejects_mismatched_features() {
        let (x, y) = threshold_features(30);
        let model = BinaryClassifier::train(&x, &y, &small_config()).unwrap();

        let renamed = FeatureMatrix::new(vec!["signal".into(), "other".into()], x.view().to_owned());
        assert_eq!(
            model.predict(&renamed),
            Err(PredictError::FeatureNameMismatch {
                index: 1,
                expected: "noise".into(),
                got: "other".into()
            })
        );

        let narrow = FeatureMatrix::new(vec!["signal".into()], x.view().slice(ndarray::s![.., ..1]).to_owned());
        assert_eq!(
            model.predict(&narrow),
            Err(PredictError::FeatureCountMismatch { expected: 2, got: 1 })
        );
    }

    #[test]
    fn training_errors_propagate() {
        let (x, _) = threshold_features(10);
        let err = BinaryClassifier::train(&x, &[1.0], &small_config()).unwrap_err();
        assert!(matches!(err, TrainError::TargetLenMismatch { .. }));
    }
}
