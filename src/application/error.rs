//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add serialization and I/O context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("unsupported dialog format: {0} (expected a .json file)")]
    UnsupportedFormat(PathBuf),

    #[error("malformed dialog data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode dialog: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("dialog is nested too deeply to store: {depth} branches deep (at most {max})")]
    TooDeep { depth: usize, max: usize },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
