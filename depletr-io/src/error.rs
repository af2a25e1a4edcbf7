use std::io;
use thiserror::Error;

use depletr_core::errors::SourceError;

/// Error type for depletr-io operations.
#[derive(Error, Debug)]
pub enum DepletrIoError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be turned into an annotation record at all.
    #[error("{path}:{line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    /// The file extension does not name a supported annotation format.
    #[error("Unsupported annotation format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result type alias for depletr-io operations.
pub type Result<T> = std::result::Result<T, DepletrIoError>;
