//! Feature table loaders.

mod csv;
mod error;

pub use csv::{load_csv, read_csv, CsvOptions};
pub use error::DatasetLoadError;
