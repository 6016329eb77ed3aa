//! Error type for batch conversion.
//!
//! Host, discovery and filesystem failures are consolidated into
//! `ConversionError`, which maps onto `modelport_core::AppError`.

use std::path::PathBuf;

use modelport_core::error::{AppError, ErrorKind};
use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::host::HostError;

/// Unified error type for batch conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The target format token was empty.
    #[error("Target format must not be empty")]
    EmptyTargetFormat,

    /// The source directory does not exist.
    #[error("Source directory not found: {path}")]
    DirectoryNotFound {
        /// The directory that was requested.
        path: PathBuf,
    },

    /// The source path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Opening or exporting one entry failed in the host.
    #[error("Failed to convert '{entry}': {source}")]
    Host {
        /// Source file name of the entry.
        entry: String,
        /// The host failure.
        #[source]
        source: HostError,
    },

    /// The host executable could not be located.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Wrap a host failure with the entry it happened on.
    pub fn host(entry: impl Into<String>, source: HostError) -> Self {
        Self::Host {
            entry: entry.into(),
            source,
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        let kind = match &err {
            ConversionError::EmptyTargetFormat => ErrorKind::Validation,
            ConversionError::DirectoryNotFound { .. } => ErrorKind::NotFound,
            ConversionError::NotADirectory { .. } => ErrorKind::Validation,
            ConversionError::Host { .. } => ErrorKind::ExternalHost,
            ConversionError::Discovery(_) => ErrorKind::NotFound,
            ConversionError::Io(_) => ErrorKind::Io,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
