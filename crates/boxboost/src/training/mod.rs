//! Training infrastructure for the gradient-boosted classifier.
//!
//! - [`Gradients`]: SoA gradient/hessian buffer
//! - [`ObjectiveFn`], [`LogisticLoss`]: loss functions
//! - [`MetricFn`], [`LogLoss`], [`Accuracy`], [`F1Score`], [`Auc`]: metrics
//! - [`TrainingLogger`], [`Verbosity`]: progress reporting
//! - [`gbdt`]: histogram tree growth and the boosting loop

pub mod gbdt;
mod gradients;
mod logger;
mod metrics;
mod objective;

pub use gbdt::{GBDTParams, GBDTTrainer, GainParams, GrowerParams, TrainError};
pub use gradients::Gradients;
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{Accuracy, Auc, ConfusionMatrix, F1Score, LogLoss, MetricFn};
pub use objective::{LogisticLoss, ObjectiveFn};
