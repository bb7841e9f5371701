//! The trained classifier, its configuration and its artifacts.
//!
//! - [`ClassifierConfig`]: validated hyperparameters
//! - [`BinaryClassifier`]: forest plus feature names, with prediction helpers
//! - [`TrainingArtifacts`]: what a training run hands back to the caller

mod artifacts;
mod classifier;
mod config;

pub use artifacts::{read_json, write_json, PersistError, TrainingArtifacts};
pub use classifier::{BinaryClassifier, PredictError, DECISION_THRESHOLD};
pub use config::{ClassifierConfig, ConfigError};
