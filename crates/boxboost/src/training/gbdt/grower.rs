//! Depth-wise histogram tree grower.
//!
//! For every node of the current level, gradient/hessian histograms are built
//! per feature from the node's rows, the best numeric split is searched over
//! bin boundaries (trying the missing bin on both sides), and rows are
//! partitioned into the children. Nodes that cannot improve the loss, and all
//! nodes at `max_depth`, become leaves.

use crate::data::BinnedMatrix;
use crate::repr::{MutableTree, NodeId, Tree};
use crate::training::Gradients;
use crate::utils::Parallelism;

use super::gain::GainParams;

/// Splits must beat this gain to be applied, so round-off never adds nodes.
const MIN_SPLIT_IMPROVEMENT: f64 = 1e-6;

/// Parameters for growing one tree.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub learning_rate: f32,
    /// Maximum depth; the root is depth 0.
    pub max_depth: u32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.3,
            max_depth: 6,
        }
    }
}

/// Best split found for one node.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SplitInfo {
    pub feature: u32,
    /// Rows with `bin <= bin` go left.
    pub bin: usize,
    pub default_left: bool,
    pub gain: f64,
    pub left: (f64, f64),
    pub right: (f64, f64),
}

#[derive(Clone, Copy, Debug, Default)]
struct HistogramBin {
    grad: f64,
    hess: f64,
    count: u32,
}

/// Node waiting to be split or turned into a leaf.
struct NodeCandidate {
    node: NodeId,
    rows: Vec<u32>,
    grad: f64,
    hess: f64,
}

/// Grows trees from gradients over a fixed binned matrix.
pub struct TreeGrower {
    params: GrowerParams,
    parallelism: Parallelism,
    tree_builder: MutableTree,
    /// Learning-rate-scaled leaf value of each row for the last grown tree.
    row_values: Vec<f32>,
}

impl TreeGrower {
    pub fn new(params: GrowerParams, n_rows: usize, parallelism: Parallelism) -> Self {
        Self {
            params,
            parallelism,
            tree_builder: MutableTree::new(),
            row_values: vec![0.0; n_rows],
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow one tree. Leaf values already include the learning rate.
    pub fn grow(&mut self, binned: &BinnedMatrix, gradients: &Gradients) -> Tree {
        let n_rows = binned.n_rows();
        assert_eq!(gradients.n_samples(), n_rows);
        self.row_values.clear();
        self.row_values.resize(n_rows, 0.0);

        let root = self.tree_builder.init_root();
        let rows: Vec<u32> = (0..n_rows as u32).collect();
        let (grad, hess) = gradients.sum(&rows);

        let mut level = vec![NodeCandidate { node: root, rows, grad, hess }];
        for _depth in 0..self.params.max_depth {
            let mut next_level = Vec::with_capacity(level.len() * 2);
            for candidate in level {
                match self.find_split(binned, gradients, &candidate) {
                    Some(split) => {
                        let (left, right) = self.apply_split(binned, candidate, &split);
                        next_level.push(left);
                        next_level.push(right);
                    }
                    None => self.finish_leaf(candidate),
                }
            }
            level = next_level;
            if level.is_empty() {
                break;
            }
        }
        for candidate in level {
            self.finish_leaf(candidate);
        }

        self.tree_builder.apply_learning_rate(self.params.learning_rate);
        std::mem::take(&mut self.tree_builder).freeze()
    }

    /// Add the last grown tree's output to `predictions`.
    pub fn update_predictions(&self, predictions: &mut [f32]) {
        debug_assert_eq!(predictions.len(), self.row_values.len());
        let row_values = &self.row_values;
        self.parallelism
            .maybe_par_for_each_mut(predictions, |row, p| *p += row_values[row]);
    }

    fn finish_leaf(&mut self, candidate: NodeCandidate) {
        let weight = self.params.gain.leaf_weight(candidate.grad, candidate.hess);
        self.tree_builder.make_leaf(candidate.node, weight);
        let scaled = weight * self.params.learning_rate;
        for &row in &candidate.rows {
            self.row_values[row as usize] = scaled;
        }
    }

    fn apply_split(
        &mut self,
        binned: &BinnedMatrix,
        candidate: NodeCandidate,
        split: &SplitInfo,
    ) -> (NodeCandidate, NodeCandidate) {
        let feature = split.feature as usize;
        let mapper = binned.mapper(feature);
        let threshold = mapper.threshold(split.bin);
        let (left_node, right_node) =
            self.tree_builder
                .apply_split(candidate.node, split.feature, threshold, split.default_left);

        let missing_bin = mapper.missing_bin();
        let bins = binned.feature_bins(feature);
        let (left_rows, right_rows): (Vec<u32>, Vec<u32>) =
            candidate.rows.into_iter().partition(|&row| {
                let bin = bins[row as usize] as usize;
                if bin == missing_bin {
                    split.default_left
                } else {
                    bin <= split.bin
                }
            });

        (
            NodeCandidate {
                node: left_node,
                rows: left_rows,
                grad: split.left.0,
                hess: split.left.1,
            },
            NodeCandidate {
                node: right_node,
                rows: right_rows,
                grad: split.right.0,
                hess: split.right.1,
            },
        )
    }

    fn find_split(
        &self,
        binned: &BinnedMatrix,
        gradients: &Gradients,
        candidate: &NodeCandidate,
    ) -> Option<SplitInfo> {
        if candidate.rows.len() < 2 {
            return None;
        }
        let per_feature = self.parallelism.maybe_par_map(0..binned.n_features(), |f| {
            let histogram = build_histogram(binned, f, gradients, &candidate.rows);
            best_split_for_feature(&self.params.gain, f as u32, &histogram, binned.mapper(f).missing_bin())
        });

        // Reduce in feature order: the first feature wins ties.
        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitInfo>, split| match best {
                Some(b) if b.gain >= split.gain => Some(b),
                _ => Some(split),
            })
            .filter(|split| split.gain > MIN_SPLIT_IMPROVEMENT)
    }
}

fn build_histogram(binned: &BinnedMatrix, feature: usize, gradients: &Gradients, rows: &[u32]) -> Vec<HistogramBin> {
    let mut histogram = vec![HistogramBin::default(); binned.mapper(feature).n_bins()];
    let bins = binned.feature_bins(feature);
    let (grads, hess) = (gradients.grads(), gradients.hess());
    for &row in rows {
        let r = row as usize;
        let slot = &mut histogram[bins[r] as usize];
        slot.grad += grads[r] as f64;
        slot.hess += hess[r] as f64;
        slot.count += 1;
    }
    histogram
}

/// Scan the bin boundaries of one feature, left to right.
fn best_split_for_feature(
    gain: &GainParams,
    feature: u32,
    histogram: &[HistogramBin],
    missing_bin: usize,
) -> Option<SplitInfo> {
    let missing = histogram[missing_bin];
    let (total_grad, total_hess, total_count) = histogram
        .iter()
        .fold((0.0, 0.0, 0u32), |(g, h, c), b| (g + b.grad, h + b.hess, c + b.count));

    let mut best: Option<SplitInfo> = None;
    let mut acc = HistogramBin::default();

    // The boundary after the last value bin only separates valued rows from
    // missing ones, so it is tried with missing rows on the right.
    let last_value_bin = missing_bin.saturating_sub(1);
    for bin in 0..missing_bin {
        acc.grad += histogram[bin].grad;
        acc.hess += histogram[bin].hess;
        acc.count += histogram[bin].count;

        let directions: &[bool] = match (bin == last_value_bin, missing.count > 0) {
            (true, true) => &[false],
            (true, false) => &[],
            (false, true) => &[false, true],
            (false, false) => &[false],
        };
        for &default_left in directions {
            let (mut left, mut left_count) = ((acc.grad, acc.hess), acc.count);
            if default_left {
                left.0 += missing.grad;
                left.1 += missing.hess;
                left_count += missing.count;
            }
            let right = (total_grad - left.0, total_hess - left.1);
            let right_count = total_count - left_count;

            if left_count == 0 || right_count == 0 || !gain.is_valid_split(left.1, right.1) {
                continue;
            }
            let split_gain = gain.split_gain(left, right);
            if best.as_ref().is_none_or(|b| split_gain > b.gain) {
                best = Some(SplitInfo {
                    feature,
                    bin,
                    default_left,
                    gain: split_gain,
                    left,
                    right,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{LogisticLoss, ObjectiveFn};
    use ndarray::{array, Array2};

    fn gradients_for(targets: &[f32]) -> Gradients {
        let mut g = Gradients::new(targets.len());
        LogisticLoss::default().compute_gradients(&vec![0.0; targets.len()], targets, &mut g);
        g
    }

    fn permissive(max_depth: u32) -> GrowerParams {
        GrowerParams {
            gain: GainParams {
                min_child_weight: 0.0,
                ..Default::default()
            },
            learning_rate: 1.0,
            max_depth,
        }
    }

    #[test]
    fn separable_feature_gives_a_stump() {
        let x = array![[1.0f32], [2.0], [3.0], [4.0]];
        let binned = BinnedMatrix::from_features(x.view(), 16, Parallelism::Sequential);
        let g = gradients_for(&[0.0, 0.0, 1.0, 1.0]);

        let mut grower = TreeGrower::new(permissive(1), 4, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.split_feature(0), 0);
        assert_eq!(tree.threshold(0), 2.5);
        assert!(tree.predict_row(&[1.5]) < 0.0);
        assert!(tree.predict_row(&[3.5]) > 0.0);
    }

    #[test]
    fn constant_gradients_give_a_leaf() {
        let x = array![[1.0f32], [2.0], [3.0]];
        let binned = BinnedMatrix::from_features(x.view(), 16, Parallelism::Sequential);
        let g = gradients_for(&[1.0, 1.0, 1.0]);

        let mut grower = TreeGrower::new(permissive(3), 3, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);
        assert_eq!(tree.n_nodes(), 1);
        // -(3 * -0.5) / (3 * 0.25 + 1)
        approx::assert_abs_diff_eq!(tree.leaf_value(0), 1.5 / 1.75, epsilon = 1e-6);
    }

    #[test]
    fn depth_is_bounded() {
        let x = Array2::from_shape_fn((16, 1), |(i, _)| i as f32);
        let targets: Vec<f32> = (0..16).map(|i| (i % 2) as f32).collect();
        let binned = BinnedMatrix::from_features(x.view(), 32, Parallelism::Sequential);
        let g = gradients_for(&targets);

        let mut grower = TreeGrower::new(permissive(2), 16, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);
        assert!(tree.n_leaves() <= 4);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn missing_values_pick_the_better_side() {
        // Missing rows share the label of the high values.
        let x = array![[1.0f32], [2.0], [3.0], [4.0], [f32::NAN], [f32::NAN]];
        let binned = BinnedMatrix::from_features(x.view(), 16, Parallelism::Sequential);
        let g = gradients_for(&[0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);

        let mut grower = TreeGrower::new(permissive(1), 6, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);
        assert!(!tree.default_left(0));
        assert_eq!(tree.predict_row(&[f32::NAN]), tree.predict_row(&[4.0]));
    }

    #[test]
    fn missing_rows_can_be_split_from_all_values() {
        // Only the missing rows are positive.
        let x = array![[1.0f32], [2.0], [3.0], [4.0], [f32::NAN], [f32::NAN]];
        let binned = BinnedMatrix::from_features(x.view(), 16, Parallelism::Sequential);
        let g = gradients_for(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);

        let mut grower = TreeGrower::new(permissive(1), 6, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);
        assert_eq!(tree.n_nodes(), 3);
        assert!(!tree.default_left(0));
        assert_eq!(tree.threshold(0), f32::MAX);
        assert!(tree.predict_row(&[4.0]) < 0.0);
        assert!(tree.predict_row(&[f32::NAN]) > 0.0);

        let mut preds = vec![0.0; 6];
        grower.update_predictions(&mut preds);
        assert_eq!(preds[3], tree.predict_row(&[4.0]));
        assert_eq!(preds[4], tree.predict_row(&[f32::NAN]));
    }

    #[test]
    fn row_updates_match_tree_predictions() {
        let x = array![[1.0f32, 5.0], [2.0, 3.0], [3.0, 1.0], [4.0, f32::NAN], [5.0, 2.0]];
        let binned = BinnedMatrix::from_features(x.view(), 16, Parallelism::Sequential);
        let g = gradients_for(&[0.0, 1.0, 0.0, 1.0, 1.0]);

        let mut grower = TreeGrower::new(permissive(3), 5, Parallelism::Sequential);
        let tree = grower.grow(&binned, &g);
        let mut preds = vec![0.0; 5];
        grower.update_predictions(&mut preds);

        for (r, p) in preds.iter().enumerate() {
            let row = x.row(r).to_vec();
            assert_eq!(*p, tree.predict_row(&row));
        }
    }

    #[test]
    fn parallel_search_matches_sequential() {
        let x = Array2::from_shape_fn((40, 3), |(i, j)| ((i * (j + 3)) % 11) as f32);
        let targets: Vec<f32> = (0..40).map(|i| ((i * 7) % 3 == 0) as u8 as f32).collect();
        let g = gradients_for(&targets);

        let binned = BinnedMatrix::from_features(x.view(), 8, Parallelism::Sequential);
        let seq = TreeGrower::new(GrowerParams::default(), 40, Parallelism::Sequential).grow(&binned, &g);
        let par = TreeGrower::new(GrowerParams::default(), 40, Parallelism::Parallel).grow(&binned, &g);
        assert_eq!(seq, par);
    }
}
