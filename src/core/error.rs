//! Document Errors
//!
//! Failure kinds surfaced by documents and the registry.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::document::DocumentId;

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another open document already uses this path
    #[error("Specified path is already opened: {}", .0.display())]
    PathConflict(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Document index {index} out of range (open documents: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Document {0} is not open")]
    UnknownDocument(DocumentId),
}

impl DocumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DocumentError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DocumentError::InvalidArgument(message.into())
    }
}
