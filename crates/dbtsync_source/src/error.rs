//! Error types for source document handling.

use std::path::PathBuf;
use thiserror::Error;

/// The loaded YAML is not a single-dataset, single-table dbt source file.
///
/// Only raised while validating a freshly loaded document, never while
/// mutating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("not a dbt source document")]
    NotASourceDocument,

    #[error("contains multiple datasets")]
    MultipleDatasets,

    #[error("no tables")]
    NoTables,

    #[error("contains multiple tables")]
    MultipleTables,
}

/// Errors from loading warehouse table metadata.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("Failed to read table metadata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid table metadata: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid source document: {0}")]
    Shape(#[from] ShapeError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("Document was not loaded from a file; nothing to reload")]
    NoSourcePath,
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    /// The shape violation behind this error, if it is one.
    pub fn shape(&self) -> Option<ShapeError> {
        match self {
            SourceError::Shape(shape) => Some(*shape),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
