//! Split gain and leaf weight under L1/L2 regularization.

/// Regularization and split constraints used while growing trees.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization on leaf weights (lambda).
    pub reg_lambda: f32,
    /// L1 regularization on leaf weights (alpha).
    pub reg_alpha: f32,
    /// Minimum gain for a split to be kept (gamma).
    pub min_gain: f32,
    /// Minimum hessian sum on each side of a split.
    pub min_child_weight: f32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl GainParams {
    /// Gradient sum after L1 soft thresholding.
    #[inline]
    fn thresholded(&self, grad: f64) -> f64 {
        let alpha = self.reg_alpha as f64;
        if grad > alpha {
            grad - alpha
        } else if grad < -alpha {
            grad + alpha
        } else {
            0.0
        }
    }

    /// Structure score of a node: `T(G)² / (H + λ)`.
    #[inline]
    pub fn node_score(&self, grad: f64, hess: f64) -> f64 {
        let g = self.thresholded(grad);
        g * g / (hess + self.reg_lambda as f64)
    }

    /// Loss reduction of splitting a parent into `left` and `right`:
    ///
    /// ```text
    /// gain = 0.5 * [score(L) + score(R) - score(P)] - γ
    /// ```
    ///
    /// Children are given as `(grad_sum, hess_sum)`; the parent is their sum.
    #[inline]
    pub fn split_gain(&self, left: (f64, f64), right: (f64, f64)) -> f64 {
        let parent = (left.0 + right.0, left.1 + right.1);
        0.5 * (self.node_score(left.0, left.1) + self.node_score(right.0, right.1)
            - self.node_score(parent.0, parent.1))
            - self.min_gain as f64
    }

    /// Both children carry at least `min_child_weight` hessian.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight && hess_right >= min_weight
    }

    /// Newton step for a leaf: `-T(G) / (H + λ)`.
    #[inline]
    pub fn leaf_weight(&self, grad: f64, hess: f64) -> f32 {
        (-self.thresholded(grad) / (hess + self.reg_lambda as f64)) as f32
    }
}
