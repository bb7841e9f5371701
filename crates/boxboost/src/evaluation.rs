//! Held-out evaluation of a trained classifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::FeatureMatrix;
use crate::model::{BinaryClassifier, PredictError, DECISION_THRESHOLD};
use crate::training::{Accuracy, Auc, ConfusionMatrix, F1Score, MetricFn};

/// Scores of a classifier on labelled rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    /// F1 of the positive class.
    pub f1: f64,
    /// ROC AUC; 0.5 when the labels hold a single class.
    pub auc: f64,
}

impl EvaluationReport {
    /// Score probabilities of the positive class against `{0, 1}` labels.
    pub fn from_probabilities(probabilities: &[f32], labels: &[f32]) -> Self {
        debug_assert_eq!(probabilities.len(), labels.len());

        let n_positive = labels.iter().filter(|&&l| l > 0.5).count();
        if n_positive == 0 || n_positive == labels.len() {
            tracing::warn!(n_rows = labels.len(), n_positive, "evaluation labels hold a single class; AUC reported as 0.5");
        }

        Self {
            confusion: ConfusionMatrix::from_probabilities(probabilities, labels, DECISION_THRESHOLD),
            accuracy: Accuracy { threshold: DECISION_THRESHOLD }.compute(probabilities, labels),
            f1: F1Score { threshold: DECISION_THRESHOLD }.compute(probabilities, labels),
            auc: Auc.compute(probabilities, labels),
        }
    }
}

/// Predict `features` with `model` and score against `labels`.
pub fn evaluate(
    model: &BinaryClassifier,
    features: &FeatureMatrix,
    labels: &[f32],
) -> Result<EvaluationReport, PredictError> {
    let probabilities = model.predict_proba(features)?;
    Ok(EvaluationReport::from_probabilities(&probabilities, labels))
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.confusion)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "F1 score: {:.4}", self.f1)?;
        writeln!(f, "ROC AUC:  {:.4}", self.auc)
    }
}
