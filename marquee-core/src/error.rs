use std::path::PathBuf;

use marquee_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{list} entry references person #{index}, but only {names} are known")]
    DanglingRole {
        list: &'static str,
        index: i64,
        names: usize,
    },

    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<MergeError>,
    },
}

impl MergeError {
    pub fn at(self, field: &'static str) -> Self {
        MergeError::Field {
            field,
            source: Box::new(self),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Record(#[from] ModelError),

    #[error("Invalid record {id}: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: ModelError,
    },

    #[error("Unexpected content in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("Invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
