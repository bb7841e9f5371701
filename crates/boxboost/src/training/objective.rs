//! Objective (loss) functions for gradient boosting.
//!
//! An objective turns the current raw predictions (margins) into per-row
//! gradients and hessians, provides the initial constant prediction, and maps
//! margins to semantic predictions.

use super::Gradients;

/// An objective (loss) function for training gradient boosted models.
pub trait ObjectiveFn: Send + Sync {
    /// Compute gradients and hessians for the given margins.
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients);

    /// The optimal constant margin before any trees are added.
    fn compute_base_score(&self, targets: &[f32]) -> f32;

    /// Transform margins in place into semantic predictions.
    fn transform_predictions(&self, predictions: &mut [f32]);

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Logistic Loss
// =============================================================================

/// Logistic loss (binary cross-entropy) with positive-class weighting.
///
/// Expects labels in {0, 1} and outputs log-odds. Rows with label 1 are
/// weighted by `scale_pos_weight`, rows with label 0 by 1.
/// - Gradient: `w * (σ(pred) - y)`
/// - Hessian: `w * σ(pred) * (1 - σ(pred))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticLoss {
    pub scale_pos_weight: f32,
}

impl Default for LogisticLoss {
    fn default() -> Self {
        Self { scale_pos_weight: 1.0 }
    }
}

impl LogisticLoss {
    pub fn with_scale_pos_weight(scale_pos_weight: f32) -> Self {
        Self { scale_pos_weight }
    }

    #[inline]
    pub fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    #[inline]
    fn weight(&self, target: f32) -> f32 {
        if target > 0.5 { self.scale_pos_weight } else { 1.0 }
    }
}

impl ObjectiveFn for LogisticLoss {
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients) {
        debug_assert_eq!(predictions.len(), targets.len());
        debug_assert_eq!(predictions.len(), gradients.n_samples());

        const HESS_MIN: f32 = 1e-6;

        let (grads, hess) = gradients.as_mut_slices();
        for i in 0..predictions.len() {
            let w = self.weight(targets[i]);
            let p = Self::sigmoid(predictions[i]);
            grads[i] = w * (p - targets[i]);
            hess[i] = (w * p * (1.0 - p)).max(HESS_MIN);
        }
    }

    fn compute_base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }

        let (pos_weight, total_weight) = targets.iter().fold((0.0f64, 0.0f64), |(pos, total), &t| {
            let w = self.weight(t) as f64;
            (pos + t as f64 * w, total + w)
        });

        // Convert to log-odds
        let p = (pos_weight / total_weight).clamp(1e-7, 1.0 - 1e-7);
        (p / (1.0 - p)).ln() as f32
    }

    fn transform_predictions(&self, predictions: &mut [f32]) {
        for x in predictions.iter_mut() {
            *x = Self::sigmoid(*x);
        }
    }

    fn name(&self) -> &'static str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gradients_at_zero_margin() {
        let loss = LogisticLoss::default();
        let mut g = Gradients::new(2);
        loss.compute_gradients(&[0.0, 0.0], &[1.0, 0.0], &mut g);
        assert_abs_diff_eq!(g.get(0).0, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(g.get(1).0, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(g.get(0).1, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn positive_rows_are_scaled() {
        let loss = LogisticLoss::with_scale_pos_weight(10.0);
        let mut g = Gradients::new(2);
        loss.compute_gradients(&[0.0, 0.0], &[1.0, 0.0], &mut g);
        assert_abs_diff_eq!(g.get(0).0, -5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g.get(0).1, 2.5, epsilon = 1e-6);
        assert_abs_diff_eq!(g.get(1).0, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn base_score_is_weighted_log_odds() {
        let targets = [1.0, 0.0, 0.0, 0.0];
        assert_abs_diff_eq!(LogisticLoss::default().compute_base_score(&targets), (1.0f32 / 3.0).ln(), epsilon = 1e-5);
        // One positive weighted 3x balances three negatives.
        assert_abs_diff_eq!(LogisticLoss::with_scale_pos_weight(3.0).compute_base_score(&targets), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn transform_is_sigmoid() {
        let mut preds = [0.0f32, 100.0, -100.0];
        LogisticLoss::default().transform_predictions(&mut preds);
        assert_abs_diff_eq!(preds[0], 0.5, epsilon = 1e-6);
        assert!(preds[1] > 0.999);
        assert!(preds[2] < 0.001);
    }
}
