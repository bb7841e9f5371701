//! Additive ensemble of trees with a single output.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use super::tree::{Tree, TreeValidationError};
use crate::utils::Parallelism;

/// Problems found by [`Forest::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score is not finite: {0}")]
    NonFiniteBaseScore(f32),

    #[error("tree {index}: {source}")]
    InvalidTree {
        index: usize,
        #[source]
        source: TreeValidationError,
    },
}

/// Sum of tree outputs on top of a constant base score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    base_score: f32,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn new(base_score: f32) -> Self {
        Self {
            base_score,
            trees: Vec::new(),
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Raw score (margin) for one row.
    pub fn predict_margin_row(&self, features: &[f32]) -> f32 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.predict_row(features))
    }

    /// Raw scores for every row of a `(n_rows, n_features)` matrix.
    pub fn predict_margin(&self, features: ArrayView2<'_, f32>, parallelism: Parallelism) -> Vec<f32> {
        let rows: Vec<usize> = (0..features.nrows()).collect();
        parallelism.maybe_par_map(&rows, |&r| {
            let row = features.row(r);
            match row.as_slice() {
                Some(slice) => self.predict_margin_row(slice),
                None => self.predict_margin_row(&row.to_vec()),
            }
        })
    }

    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore(self.base_score));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|source| ForestValidationError::InvalidTree { index, source })?;
        }
        Ok(())
    }
}
