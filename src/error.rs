//! Error type shared by the parser, services and protocol layers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Filesystem access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded to text
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The document is not a well-formed translation catalog
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A locale identifier could not be parsed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Project configuration or layout problem
    #[error("Project error: {0}")]
    Project(String),

    /// Malformed protocol request
    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
