//! Data handling: feature tables, feature matrices, binning and loading.
//!
//! # Key Types
//!
//! - [`FeatureTable`]: named numeric columns, one row per detection box
//! - [`FeatureMatrix`]: dense `(n_rows, n_features)` matrix for the classifier
//! - [`BinnedMatrix`]: quantile-binned features used during tree growth
//!
//! # Loading
//!
//! [`io::load_csv`] reads a CSV file with a header row into a [`FeatureTable`].

pub mod binned;
pub mod io;
mod matrix;
mod split;
mod table;

pub use binned::{BinMapper, BinnedMatrix};
pub use matrix::{split_features_labels, FeatureMatrix};
pub use split::{train_test_split, SplitIndices, SplitOptions};
pub use table::{
    Column, FeatureTable, FrameKey, TableError, FRAME, LABEL, OCCLUSION, XMAX, XMIN, YMAX, YMIN,
};
