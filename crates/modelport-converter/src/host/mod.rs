//! The external modeling host, seen through its open/export capability pair.
//!
//! A host holds at most one active document. `open_document` replaces it,
//! `export_active_document` writes it out under a new name. The active
//! document is never reset by the converter; after a batch the host still
//! holds whatever was opened last.

mod dry_run;
mod process;

pub use dry_run::{DryRunHost, HostCall};
pub use process::{ProcessHost, ProcessOutput};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a host driver.
#[derive(Debug, Error)]
pub enum HostError {
    /// Export was requested before any document was opened.
    #[error("No active document")]
    NoActiveDocument,

    /// The document to open does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    /// The document path is not a regular file.
    #[error("Not a document file: {0}")]
    NotADocument(PathBuf),

    /// The host executable could not be started.
    #[error("Failed to start host '{command}': {source}")]
    Spawn {
        /// The executable that was launched.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The host process timed out.
    #[error("Host timed out after {0} seconds")]
    Timeout(u64),

    /// The host process exited with a non-zero code.
    #[error("Host exited with code {code}: {stderr}")]
    ProcessFailed {
        /// The exit code.
        code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// The host process was terminated by a signal.
    #[error("Host process was killed (signal termination)")]
    Killed,

    /// The host reported success but the output file is missing.
    #[error("Expected output file not created: {0}")]
    OutputMissing(PathBuf),

    /// A path cannot be embedded in a generated script.
    #[error("Path is not valid UTF-8: {0}")]
    InvalidUtf8Path(PathBuf),

    /// IO error while preparing or checking a conversion.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The document a host currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDocument {
    /// Path as handed to `open_document` (relative to the working directory).
    pub path: PathBuf,
    /// Whether the document was opened read-only.
    pub read_only: bool,
}

/// Open/export capability of an external modeling host.
#[async_trait]
pub trait ModelHost: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Make `path` the active document. `read_only` is forwarded to the host.
    async fn open_document(&mut self, path: &Path, read_only: bool) -> Result<(), HostError>;

    /// Write the active document to `output`, in the format implied by its
    /// extension. When `interactive` is false the host must not prompt.
    async fn export_active_document(
        &mut self,
        output: &Path,
        interactive: bool,
    ) -> Result<(), HostError>;

    /// The document currently held by the host.
    fn active_document(&self) -> Option<&ActiveDocument>;
}

/// Check that `path` names an existing regular file.
pub(crate) async fn ensure_document(path: &Path) -> Result<(), HostError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(HostError::NotADocument(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(HostError::DocumentNotFound(path.to_path_buf()))
        }
        Err(e) => Err(HostError::Io(e)),
    }
}
