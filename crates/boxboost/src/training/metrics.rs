//! Binary classification metrics.
//!
//! Metrics take probability predictions and {0, 1} targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A metric for evaluating model quality.
pub trait MetricFn: Send + Sync {
    /// Compute the metric over probability predictions.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Whether higher values indicate a better model.
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// LogLoss (Binary Cross-Entropy)
// =============================================================================

/// Binary cross-entropy: -mean(y*log(p) + (1-y)*log(1-p))
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoss;

impl MetricFn for LogLoss {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }

        const EPS: f64 = 1e-15;

        let sum_loss: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &l)| {
                let p = (p as f64).clamp(EPS, 1.0 - EPS);
                let l = l as f64;
                -(l * p.ln() + (1.0 - l) * (1.0 - p).ln())
            })
            .sum();

        sum_loss / predictions.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "logloss"
    }
}

// =============================================================================
// Accuracy
// =============================================================================

/// Proportion of correct predictions at a probability threshold.
#[derive(Debug, Clone, Copy)]
pub struct Accuracy {
    pub threshold: f32,
}

impl Default for Accuracy {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl MetricFn for Accuracy {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let confusion = ConfusionMatrix::from_probabilities(predictions, targets, self.threshold);
        (confusion.true_negative + confusion.true_positive) as f64 / confusion.total() as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

// =============================================================================
// F1
// =============================================================================

/// F1 score of the positive class at a probability threshold.
///
/// 0 when there are no true positives.
#[derive(Debug, Clone, Copy)]
pub struct F1Score {
    pub threshold: f32,
}

impl Default for F1Score {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl MetricFn for F1Score {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        let c = ConfusionMatrix::from_probabilities(predictions, targets, self.threshold);
        let denom = 2 * c.true_positive + c.false_positive + c.false_negative;
        if c.true_positive == 0 {
            0.0
        } else {
            2.0 * c.true_positive as f64 / denom as f64
        }
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "f1"
    }
}

// =============================================================================
// AUC
// =============================================================================

/// Area under the ROC curve, with ties sharing their average rank.
///
/// Returns 0.5 when only one class is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auc;

impl MetricFn for Auc {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        let n = predictions.len();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| predictions[b].total_cmp(&predictions[a]));

        let n_pos = targets.iter().filter(|&&l| l > 0.5).count();
        let n_neg = n - n_pos;

        if n_pos == 0 || n_neg == 0 {
            return 0.5;
        }

        let mut rank_sum_pos = 0.0f64;
        let mut i = 0;

        while i < n {
            let mut j = i + 1;
            while j < n && predictions[indices[i]] == predictions[indices[j]] {
                j += 1;
            }

            let avg_rank = (i + 1 + j) as f64 / 2.0;

            for &idx in indices.iter().take(j).skip(i) {
                if targets[idx] > 0.5 {
                    rank_sum_pos += avg_rank;
                }
            }

            i = j;
        }

        let n_pos_f = n_pos as f64;
        let n_neg_f = n_neg as f64;
        let sum_ascending_ranks = n_pos_f * (n as f64 + 1.0) - rank_sum_pos;

        (sum_ascending_ranks - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg_f)
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "auc"
    }
}

// =============================================================================
// Confusion Matrix
// =============================================================================

/// 2x2 confusion matrix; rows are true labels, columns predicted labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_positive: u64,
}

impl ConfusionMatrix {
    /// Count outcomes from hard {0, 1} predictions.
    pub fn from_labels(predicted: &[f32], targets: &[f32]) -> Self {
        let mut m = Self::default();
        for (&p, &t) in predicted.iter().zip(targets) {
            match (t > 0.5, p > 0.5) {
                (false, false) => m.true_negative += 1,
                (false, true) => m.false_positive += 1,
                (true, false) => m.false_negative += 1,
                (true, true) => m.true_positive += 1,
            }
        }
        m
    }

    /// Count outcomes from probabilities, predicting 1 when `p > threshold`.
    pub fn from_probabilities(probabilities: &[f32], targets: &[f32], threshold: f32) -> Self {
        let predicted: Vec<f32> = probabilities
            .iter()
            .map(|&p| if p > threshold { 1.0 } else { 0.0 })
            .collect();
        Self::from_labels(&predicted, targets)
    }

    pub fn total(&self) -> u64 {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Counts as `[[tn, fp], [fn, tp]]`.
    pub fn as_array(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    /// Each row divided by its sum. Rows without samples stay at zero.
    pub fn normalized(&self) -> [[f64; 2]; 2] {
        self.as_array().map(|row| {
            let sum = (row[0] + row[1]) as f64;
            if sum > 0.0 {
                [row[0] as f64 / sum, row[1] as f64 / sum]
            } else {
                [0.0, 0.0]
            }
        })
    }
}

const CLASS_NAMES: [&str; 2] = ["Negative", "Positive"];

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.as_array();
        let norm = self.normalized();

        writeln!(f, "Confusion matrix (rows: true, columns: predicted)")?;
        writeln!(f, "{:>10} {:>10} {:>10}", "", CLASS_NAMES[0], CLASS_NAMES[1])?;
        for (name, row) in CLASS_NAMES.iter().zip(counts) {
            writeln!(f, "{:>10} {:>10} {:>10}", name, row[0], row[1])?;
        }
        writeln!(f, "Normalized confusion matrix")?;
        writeln!(f, "{:>10} {:>10} {:>10}", "", CLASS_NAMES[0], CLASS_NAMES[1])?;
        for (name, row) in CLASS_NAMES.iter().zip(norm) {
            writeln!(f, "{:>10} {:>10.2} {:>10.2}", name, row[0], row[1])?;
        }
        Ok(())
    }
}
