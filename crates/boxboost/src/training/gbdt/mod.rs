//! Histogram-based GBDT training.
//!
//! - [`GainParams`]: split gain and leaf weights
//! - [`TreeGrower`]: grows one depth-wise tree from gradients
//! - [`GBDTTrainer`]: the boosting loop

mod gain;
mod grower;
mod trainer;

pub use gain::GainParams;
pub use grower::{GrowerParams, TreeGrower};
pub use trainer::{GBDTParams, GBDTTrainer, TrainError};
