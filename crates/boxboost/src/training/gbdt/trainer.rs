//! GBDT trainer.
//!
//! Bins the features once, then alternates gradient computation, tree growth
//! and prediction updates for a fixed number of rounds.

use ndarray::ArrayView2;

use crate::data::BinnedMatrix;
use crate::repr::Forest;
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::metrics::{LogLoss, MetricFn};
use crate::training::objective::ObjectiveFn;
use crate::training::Gradients;
use crate::utils::Parallelism;

use super::grower::{GrowerParams, TreeGrower};

// =============================================================================
// TrainError
// =============================================================================

/// Errors raised before or during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("training set has no rows")]
    EmptyDataset,

    #[error("training set has no features")]
    NoFeatures,

    #[error("got {targets} targets for {rows} rows")]
    TargetLenMismatch { rows: usize, targets: usize },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
#[derive(Clone, Debug, PartialEq)]
pub struct GBDTParams {
    /// Number of boosting rounds (one tree per round).
    pub n_trees: u32,
    /// Tree growth and regularization.
    pub grower: GrowerParams,
    /// Maximum value bins per feature.
    pub max_bins: usize,
    pub verbosity: Verbosity,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            grower: GrowerParams::default(),
            max_bins: 256,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// GBDTTrainer
// =============================================================================

pub struct GBDTTrainer<O: ObjectiveFn> {
    objective: O,
    params: GBDTParams,
}

impl<O: ObjectiveFn> GBDTTrainer<O> {
    pub fn new(objective: O, params: GBDTParams) -> Self {
        Self { objective, params }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Train a forest on a row-major `(n_rows, n_features)` matrix.
    ///
    /// Runs on the current rayon pool; wrap in [`crate::run_with_threads`]
    /// to bound the thread count.
    pub fn train(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f32],
        parallelism: Parallelism,
    ) -> Result<Forest, TrainError> {
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if n_features == 0 {
            return Err(TrainError::NoFeatures);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLenMismatch {
                rows: n_rows,
                targets: targets.len(),
            });
        }

        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(self.params.n_trees as usize, n_rows, n_features);
        if targets.iter().all(|&t| t == targets[0]) {
            logger.warn("training targets hold a single class");
        }

        let binned = BinnedMatrix::from_features(features, self.params.max_bins, parallelism);
        let mut grower = TreeGrower::new(self.params.grower.clone(), n_rows, parallelism);
        let mut gradients = Gradients::new(n_rows);

        let base_score = self.objective.compute_base_score(targets);
        let mut predictions = vec![base_score; n_rows];
        let mut forest = Forest::new(base_score);

        let log_rounds = self.params.verbosity >= Verbosity::Debug;
        let mut probabilities = Vec::new();

        for round in 0..self.params.n_trees as usize {
            self.objective.compute_gradients(&predictions, targets, &mut gradients);
            let tree = grower.grow(&binned, &gradients);
            grower.update_predictions(&mut predictions);
            forest.push_tree(tree);

            if log_rounds {
                probabilities.clone_from(&predictions);
                self.objective.transform_predictions(&mut probabilities);
                logger.log_round(round, LogLoss.name(), LogLoss.compute(&probabilities, targets));
            }
        }

        logger.finish_training(forest.n_trees());
        Ok(forest)
    }
}
