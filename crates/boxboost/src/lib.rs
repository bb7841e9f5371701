//! boxboost: box occlusion features and a gradient-boosted classifier for
//! predicting tracking failures.
//!
//! Detections are rows of a [`FeatureTable`]: one bounding box per row, keyed
//! by frame. [`augment_with_occlusion`] adds an `inter_objects_occlusion`
//! column counting, for every box, the other boxes of its frame that it
//! overlaps. [`BinaryClassifier`] is a histogram-based GBDT with a weighted
//! logistic loss, trained on those features to predict the `cls` label.
//!
//! The [`pipeline`] module wires loading, augmentation, splitting, training
//! and evaluation together.

// Re-export approx traits for users of the testing module.
pub use approx;

pub mod data;
pub mod evaluation;
pub mod model;
pub mod occlusion;
pub mod pipeline;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

pub use data::{FeatureMatrix, FeatureTable};
pub use evaluation::{evaluate, EvaluationReport};
pub use model::{BinaryClassifier, ClassifierConfig, TrainingArtifacts};
pub use occlusion::{augment_with_occlusion, overlaps, BoxBounds};
pub use pipeline::{train_from_csv, train_on_table, PipelineError, PipelineOptions};
pub use utils::{run_with_threads, Parallelism};
