//! Structure-of-Arrays decision tree and its mutable construction API.
//!
//! - [`Tree`]: immutable storage used for prediction and persistence
//! - [`MutableTree`]: node-by-node construction during training
//!
//! Splits are numeric: a row goes left when `value < threshold`, and rows with
//! a missing (NaN) value follow the node's default direction.

use serde::{Deserialize, Serialize};

/// Index of a node inside one tree. The root is always 0.
pub type NodeId = u32;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural problems found by [`Tree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("node arrays have inconsistent lengths")]
    RaggedArrays,

    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} is reached more than once")]
    DuplicateVisit { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Immutable tree with one array per node attribute.
///
/// Values of split attributes on leaf nodes, and of `leaf_values` on split
/// nodes, are unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    split_features: Box<[u32]>,
    thresholds: Box<[f32]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    /// A tree made of a single leaf.
    pub fn constant(value: f32) -> Self {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        tree.make_leaf(root, value);
        tree.freeze()
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_feature(&self, node: NodeId) -> u32 {
        self.split_features[node as usize]
    }

    #[inline]
    pub fn threshold(&self, node: NodeId) -> f32 {
        self.thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Split nodes in storage order, as `(node, feature)`.
    pub fn splits(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| (n, self.split_feature(n)))
    }

    /// The leaf reached by `features`.
    ///
    /// Features beyond the end of the slice count as missing.
    pub fn leaf_for(&self, features: &[f32]) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let value = features
                .get(self.split_feature(node) as usize)
                .copied()
                .unwrap_or(f32::NAN);

            let go_left = if value.is_nan() {
                self.default_left(node)
            } else {
                value < self.threshold(node)
            };
            node = if go_left { self.left_child(node) } else { self.right_child(node) };
        }
        node
    }

    /// Leaf value reached by `features`.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.leaf_for(features))
    }

    /// Check that every node is reachable from the root exactly once and all
    /// child indices are in bounds.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        let lengths = [
            self.split_features.len(),
            self.thresholds.len(),
            self.left_children.len(),
            self.right_children.len(),
            self.default_left.len(),
            self.leaf_values.len(),
        ];
        if lengths.iter().any(|&len| len != n_nodes) {
            return Err(TreeValidationError::RaggedArrays);
        }

        // A tree is acyclic and connected iff a walk from the root visits every
        // node exactly once.
        let mut seen = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node as usize], true) {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [("right", self.right_child(node)), ("left", self.left_child(node))] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds { node, side, child, n_nodes });
                }
                stack.push(child);
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// MutableTree
// ============================================================================

/// Tree under construction.
///
/// Nodes are allocated as placeholders and later turned into a split (which
/// allocates both children) or a leaf.
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_features: Vec<u32>,
    thresholds: Vec<f32>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl MutableTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the tree and allocate the root placeholder.
    pub fn init_root(&mut self) -> NodeId {
        *self = Self::default();
        self.allocate_node()
    }

    /// Turn `node` into a numeric split and allocate its children.
    ///
    /// Returns `(left, right)`.
    pub fn apply_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
    ) -> (NodeId, NodeId) {
        let left = self.allocate_node();
        let right = self.allocate_node();

        let idx = node as usize;
        self.split_features[idx] = feature;
        self.thresholds[idx] = threshold;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
        self.default_left[idx] = default_left;
        self.is_leaf[idx] = false;

        (left, right)
    }

    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
    }

    /// Multiply every leaf value by `learning_rate`.
    pub fn apply_learning_rate(&mut self, learning_rate: f32) {
        for (value, _) in self
            .leaf_values
            .iter_mut()
            .zip(&self.is_leaf)
            .filter(|(_, leaf)| **leaf)
        {
            *value *= learning_rate;
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn freeze(self) -> Tree {
        Tree {
            split_features: self.split_features.into_boxed_slice(),
            thresholds: self.thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
        }
    }

    fn allocate_node(&mut self) -> NodeId {
        let id = self.n_nodes() as NodeId;
        self.split_features.push(0);
        self.thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(false);
        // Placeholders are leaves with value 0 until decided otherwise.
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `x0 < 0.5 ? (x1 < 2 ? 1 : 2) : 3`, missing x0 goes right.
    fn two_level_tree() -> Tree {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (left, right) = tree.apply_split(root, 0, 0.5, false);
        let (ll, lr) = tree.apply_split(left, 1, 2.0, true);
        tree.make_leaf(ll, 1.0);
        tree.make_leaf(lr, 2.0);
        tree.make_leaf(right, 3.0);
        tree.freeze()
    }

    #[test]
    fn traversal_uses_strict_less_than() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.4, 1.0]), 1.0);
        assert_eq!(tree.predict_row(&[0.4, 2.0]), 2.0);
        assert_eq!(tree.predict_row(&[0.5, 0.0]), 3.0);
    }

    #[test]
    fn missing_values_follow_default_direction() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[f32::NAN, 0.0]), 3.0);
        assert_eq!(tree.predict_row(&[0.0, f32::NAN]), 1.0);
        // Short rows read as missing.
        assert_eq!(tree.predict_row(&[0.0]), 1.0);
    }

    #[test]
    fn learning_rate_scales_leaves_only() {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (l, r) = tree.apply_split(root, 0, 1.5, true);
        tree.make_leaf(l, 2.0);
        tree.make_leaf(r, -4.0);
        tree.apply_learning_rate(0.5);
        let tree = tree.freeze();
        assert_eq!(tree.threshold(0), 1.5);
        assert_eq!(tree.predict_row(&[1.0]), 1.0);
        assert_eq!(tree.predict_row(&[2.0]), -2.0);
    }

    #[test]
    fn counts_and_splits() {
        let tree = two_level_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.splits().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert_eq!(Tree::constant(0.7).predict_row(&[]), 0.7);
    }

    #[test]
    fn validate_accepts_grown_trees() {
        assert_eq!(two_level_tree().validate(), Ok(()));
        assert_eq!(Tree::constant(1.0).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_broken_structure() {
        let mut tree = two_level_tree();
        tree.left_children[0] = 9;
        assert!(matches!(tree.validate(), Err(TreeValidationError::ChildOutOfBounds { child: 9, .. })));

        let mut tree = two_level_tree();
        tree.right_children[1] = 2;
        assert!(matches!(tree.validate(), Err(TreeValidationError::DuplicateVisit { .. })));

        let mut tree = two_level_tree();
        tree.is_leaf[1] = true;
        assert_eq!(tree.validate(), Err(TreeValidationError::UnreachableNode { node: 3 }));
    }
}
