//! End-to-end training flows.
//!
//! - [`train_from_csv`]: load, augment with occlusion counts, hold out a test
//!   split, train on the rest and evaluate
//! - [`train_on_table`]: train on every row of an in-memory table
//!
//! Both return the artifacts instead of storing them.

use std::path::Path;

use thiserror::Error;

use crate::data::io::{load_csv, CsvOptions, DatasetLoadError};
use crate::data::{split_features_labels, train_test_split, FeatureTable, SplitIndices, SplitOptions, TableError};
use crate::evaluation::{evaluate, EvaluationReport};
use crate::model::{BinaryClassifier, ClassifierConfig, ConfigError, PredictError, TrainingArtifacts};
use crate::occlusion::augment_with_occlusion;
use crate::training::{TrainError, TrainingLogger};
use crate::utils::Parallelism;

/// Errors of the training pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load dataset: {0}")]
    Load(#[from] DatasetLoadError),

    #[error("malformed table: {0}")]
    Table(#[from] TableError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    #[error("evaluation failed: {0}")]
    Predict(#[from] PredictError),
}

/// Options of [`train_from_csv`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Default: comma-delimited with a leading index column to drop.
    pub csv: CsvOptions,
    pub split: SplitOptions,
    pub config: ClassifierConfig,
    /// Add `inter_objects_occlusion` before training. Default: `true`.
    pub augment: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            csv: CsvOptions {
                drop_first_column: true,
                ..Default::default()
            },
            split: SplitOptions::default(),
            config: ClassifierConfig::default(),
            augment: true,
        }
    }
}

/// Result of [`train_from_csv`].
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Model trained on the train rows, with the full feature matrix.
    pub artifacts: TrainingArtifacts,
    /// Scores on the held-out rows.
    pub report: EvaluationReport,
    pub split: SplitIndices,
}

/// Load a CSV file and run [`train_with_holdout`] on it.
pub fn train_from_csv(path: impl AsRef<Path>, options: &PipelineOptions) -> Result<PipelineOutcome, PipelineError> {
    let path = path.as_ref();
    let table = load_csv(path, &options.csv)?;
    tracing::info!(path = %path.display(), n_rows = table.n_rows(), n_columns = table.n_columns(), "loaded dataset");
    train_with_holdout(&table, options)
}

/// Optionally augment `table`, train on a seeded train split and evaluate on
/// the held-out rows.
pub fn train_with_holdout(table: &FeatureTable, options: &PipelineOptions) -> Result<PipelineOutcome, PipelineError> {
    options.config.validate()?;
    let table = prepare(table, options.augment, &options.config)?;

    let (features, labels) = split_features_labels(&table)?;
    let split = train_test_split(features.n_rows(), &options.split)?;

    let train_x = features.select_rows(&split.train);
    let train_y = select(&labels, &split.train);
    let test_x = features.select_rows(&split.test);
    let test_y = select(&labels, &split.test);
    tracing::info!(n_train = split.train.len(), n_test = split.test.len(), "split rows");

    log_class_balance(&options.config, &train_y);
    let model = BinaryClassifier::train(&train_x, &train_y, &options.config)?;
    let report = evaluate(&model, &test_x, &test_y)?;
    tracing::info!(accuracy = report.accuracy, f1 = report.f1, auc = report.auc, "evaluated on held-out rows");

    Ok(PipelineOutcome {
        artifacts: TrainingArtifacts::new(model, features),
        report,
        split,
    })
}

/// Train on every row of `table`, which must already carry the occlusion
/// column if the model should use it.
pub fn train_on_table(table: &FeatureTable, config: &ClassifierConfig) -> Result<TrainingArtifacts, PipelineError> {
    config.validate()?;
    let (features, labels) = split_features_labels(table)?;
    log_class_balance(config, &labels);
    let model = BinaryClassifier::train(&features, &labels, config)?;
    Ok(TrainingArtifacts::new(model, features))
}

fn prepare(table: &FeatureTable, augment: bool, config: &ClassifierConfig) -> Result<FeatureTable, TableError> {
    if !augment {
        return Ok(table.clone());
    }
    let parallelism = Parallelism::from_threads(config.thread_count());
    augment_with_occlusion(table, parallelism)
}

fn log_class_balance(config: &ClassifierConfig, labels: &[f32]) {
    let n_positive = labels.iter().filter(|&&l| l > 0.5).count();
    TrainingLogger::new(config.verbosity).log_class_balance(labels.len() - n_positive, n_positive);
}

fn select(values: &[f32], rows: &[usize]) -> Vec<f32> {
    rows.iter().map(|&r| values[r]).collect()
}
