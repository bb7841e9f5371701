//! Training progress logging.
//!
//! [`TrainingLogger`] decides what to report from the configured
//! [`Verbosity`] and emits it as `tracing` events under the
//! `boxboost::training` target.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Warnings only.
    Warning,
    /// Start, end and data summaries.
    Info,
    /// Every boosting round.
    Debug,
}

/// Reports the progress of one training run.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    n_rounds: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            n_rounds: 0,
            started: None,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize, n_rows: usize, n_features: usize) {
        self.n_rounds = n_rounds;
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            tracing::info!(target: "boxboost::training", n_rounds, n_rows, n_features, "training started");
        }
    }

    /// Class balance of the training labels.
    pub fn log_class_balance(&self, n_negative: usize, n_positive: usize) {
        if self.verbosity >= Verbosity::Info {
            tracing::info!(target: "boxboost::training", n_negative, n_positive, "class balance");
        }
    }

    pub fn log_round(&self, round: usize, metric: &str, value: f64) {
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(
                target: "boxboost::training",
                round = round + 1,
                of = self.n_rounds,
                metric,
                value,
                "round finished"
            );
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            tracing::warn!(target: "boxboost::training", "{message}");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self.started.map(|t| t.elapsed().as_millis() as u64).unwrap_or(0);
            tracing::info!(target: "boxboost::training", n_trees, elapsed_ms, "training finished");
        }
    }
}
