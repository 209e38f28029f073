//! Error types for kept-core

use std::time::Duration;

use thiserror::Error;

use crate::models::NoteId;

/// Result type alias using kept-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kept-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Note is absent from the collection the operation targeted (active or trash)
    #[error("Note not found: {0}")]
    NotFound(NoteId),

    /// Malformed input, e.g. an unknown color name
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The backing store rejected a read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A backing store call did not finish in time
    #[error("Persistence timed out after {0:?}")]
    Timeout(Duration),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// HTTP transport error talking to the remote service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Persistence,
    Validation,
}

impl Error {
    /// Classify this error.
    ///
    /// Anything raised by a storage engine or transport counts as a
    /// persistence failure.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Persistence(_)
            | Self::Timeout(_)
            | Self::LibSql(_)
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Persistence,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
