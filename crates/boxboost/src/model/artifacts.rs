//! Training artifacts and their serialization.
//!
//! A training run produces the model and the feature matrix it was fit on.
//! Both can be written as JSON (readable, portable) or as a compact binary
//! blob: a 6-byte header (`BXBT` magic, major and minor version) followed by
//! a postcard payload. Where the bytes go is up to the caller.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::BinaryClassifier;
use crate::data::FeatureMatrix;
use crate::repr::ForestValidationError;

/// Magic bytes of the binary format.
pub const MAGIC: &[u8; 4] = b"BXBT";

pub const CURRENT_VERSION_MAJOR: u8 = 1;
pub const CURRENT_VERSION_MINOR: u8 = 0;

const HEADER_SIZE: usize = 6;

/// Errors while writing or reading artifacts.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] postcard::Error),

    #[error("not a boxboost artifact")]
    NotAnArtifact,

    #[error("artifact requires format {major}.{minor}, this build reads {CURRENT_VERSION_MAJOR}.x")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("invalid forest: {0}")]
    InvalidForest(#[from] ForestValidationError),

    #[error("model has {model} features but the training matrix has {matrix}")]
    FeatureMismatch { model: usize, matrix: usize },
}

/// Model and training features produced by one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArtifacts {
    pub model: BinaryClassifier,
    pub training_features: FeatureMatrix,
}

impl TrainingArtifacts {
    pub fn new(model: BinaryClassifier, training_features: FeatureMatrix) -> Self {
        Self { model, training_features }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        write_json(self, writer)
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self, PersistError> {
        let artifacts: Self = read_json(reader)?;
        artifacts.validate()?;
        Ok(artifacts)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(MAGIC);
        bytes.push(CURRENT_VERSION_MAJOR);
        bytes.push(CURRENT_VERSION_MINOR);
        Ok(postcard::to_extend(self, bytes)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < HEADER_SIZE || &bytes[..4] != MAGIC {
            return Err(PersistError::NotAnArtifact);
        }
        let (major, minor) = (bytes[4], bytes[5]);
        if major != CURRENT_VERSION_MAJOR {
            return Err(PersistError::UnsupportedVersion { major, minor });
        }
        let artifacts: Self = postcard::from_bytes(&bytes[HEADER_SIZE..])?;
        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Check the decoded forest and that model and matrix agree on features.
    pub fn validate(&self) -> Result<(), PersistError> {
        self.model.forest().validate()?;
        let (model, matrix) = (self.model.n_features(), self.training_features.n_features());
        if model != matrix {
            return Err(PersistError::FeatureMismatch { model, matrix });
        }
        Ok(())
    }
}

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> Result<(), PersistError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Read a JSON value written by [`write_json`].
pub fn read_json<T: DeserializeOwned, R: Read>(reader: R) -> Result<T, PersistError> {
    Ok(serde_json::from_reader(std::io::BufReader::new(reader))?)
}
