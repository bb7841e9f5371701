//! Error types for dataset I/O.

use std::io;

use super::super::TableError;

/// Errors that can occur when loading a feature table.
#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported column type for {column}: expected a numeric column, got {got}")]
    UnsupportedType { column: String, got: String },

    #[error("invalid table: {0}")]
    Table(#[from] TableError),
}
