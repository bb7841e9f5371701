//! Classifier configuration with builder pattern.
//!
//! [`ClassifierConfig`] is built with `bon` and validated when `build()` is
//! called.
//!
//! # Example
//!
//! ```
//! use boxboost::model::ClassifierConfig;
//!
//! // Defaults: 100 trees, depth 6, scale_pos_weight 10
//! let config = ClassifierConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 100);
//!
//! let config = ClassifierConfig::builder()
//!     .n_trees(20)
//!     .max_depth(3)
//!     .scale_pos_weight(1.0)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::training::{GBDTParams, GainParams, GrowerParams, LogisticLoss, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Learning rate must be positive.
    InvalidLearningRate(f32),
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Depth must be at least 1.
    InvalidMaxDepth,
    /// `max_bins` must be in `[2, 65534]`.
    InvalidMaxBins(usize),
    /// Negative regularization parameter.
    InvalidRegularization { field: &'static str, value: f32 },
    /// Positive-class weight must be positive.
    InvalidScalePosWeight(f32),
    /// Test fraction must be in (0, 1).
    InvalidTestFraction(f64),
    /// Too few rows to hold out a non-empty test set.
    SplitTooSmall { n_rows: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLearningRate(v) => write!(f, "learning_rate must be positive, got {}", v),
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxDepth => write!(f, "max_depth must be at least 1"),
            Self::InvalidMaxBins(v) => write!(f, "max_bins must be in [2, 65534], got {}", v),
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::InvalidScalePosWeight(v) => write!(f, "scale_pos_weight must be positive, got {}", v),
            Self::InvalidTestFraction(v) => write!(f, "test_fraction must be in (0, 1), got {}", v),
            Self::SplitTooSmall { n_rows } => {
                write!(f, "{} rows cannot be split into non-empty train and test sets", n_rows)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// ClassifierConfig
// =============================================================================

/// Configuration of the boosted binary classifier.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct ClassifierConfig {
    /// Number of boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Shrinkage applied to every tree. Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    /// Maximum tree depth. Default: 6.
    #[builder(default = 6)]
    pub max_depth: u32,

    /// L2 regularization. Default: 1.0.
    #[builder(default = 1.0)]
    pub reg_lambda: f32,

    /// L1 regularization. Default: 0.0.
    #[builder(default = 0.0)]
    pub reg_alpha: f32,

    /// Minimum loss reduction to split. Default: 0.0.
    #[builder(default = 0.0)]
    pub min_gain: f32,

    /// Minimum hessian sum per child. Default: 1.0.
    #[builder(default = 1.0)]
    pub min_child_weight: f32,

    /// Maximum value bins per feature. Default: 256.
    #[builder(default = 256)]
    pub max_bins: usize,

    /// Weight of positive rows relative to negative ones. Default: 10.0.
    #[builder(default = 10.0)]
    pub scale_pos_weight: f32,

    /// Training threads. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    /// Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: classifier_config_builder::IsComplete> ClassifierConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for non-positive learning rate or
    /// `scale_pos_weight`, zero trees or depth, out-of-range `max_bins` and
    /// negative regularization.
    pub fn build(self) -> Result<ClassifierConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ClassifierConfig {
    /// Check every field. Also used for configs that did not go through the
    /// builder, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if !(2..u16::MAX as usize).contains(&self.max_bins) {
            return Err(ConfigError::InvalidMaxBins(self.max_bins));
        }
        for (field, value) in [
            ("reg_lambda", self.reg_lambda),
            ("reg_alpha", self.reg_alpha),
            ("min_gain", self.min_gain),
            ("min_child_weight", self.min_child_weight),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }
        if !(self.scale_pos_weight > 0.0) {
            return Err(ConfigError::InvalidScalePosWeight(self.scale_pos_weight));
        }
        Ok(())
    }

    pub fn objective(&self) -> LogisticLoss {
        LogisticLoss::with_scale_pos_weight(self.scale_pos_weight)
    }

    pub fn to_gbdt_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            grower: GrowerParams {
                gain: GainParams {
                    reg_lambda: self.reg_lambda,
                    reg_alpha: self.reg_alpha,
                    min_gain: self.min_gain,
                    min_child_weight: self.min_child_weight,
                },
                learning_rate: self.learning_rate,
                max_depth: self.max_depth,
            },
            max_bins: self.max_bins,
            verbosity: self.verbosity,
        }
    }

    /// Thread count for [`crate::run_with_threads`]; 0 means all cores.
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}
