//! Error types for attribute collection, checksum handling, and the
//! structured-form boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by metadata collection and serialization.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Checksum algorithm name is not in the registry.
    #[error("unsupported checksum type {0:?}")]
    UnsupportedChecksumType(String),

    /// Source-permissions policy not supported on this platform.
    #[error("unsupported source permissions option {0:?} on this platform")]
    UnsupportedSourcePermissions(String),

    /// Entry is a socket, device, pipe, or similar.
    #[error("cannot manage files of type {ftype}: {path}")]
    UnsupportedFileType { path: PathBuf, ftype: String },

    /// Path not found.
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured form missing or malformed fields.
    #[error("invalid structured data: {0}")]
    InvalidData(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MetadataError {
    /// Create an I/O error with path context, mapping not-found and
    /// access-denied kinds onto their dedicated variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}
