//! Error types for the FCB translation layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of this crate.
///
/// The FCB codecs and the pattern matcher never fail; only host filesystem
/// access and drive-map configuration can.
#[derive(Error, Debug)]
pub enum CpmError {
    #[error("Cannot traverse {root:?}: {source}")]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid drive: {0}")]
    InvalidDrive(char),

    #[error("Drive not mounted: {0}")]
    DriveNotMounted(char),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CP/M file operations.
pub type CpmResult<T> = Result<T, CpmError>;
