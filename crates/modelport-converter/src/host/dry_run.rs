//! Host driver that records calls without launching anything.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ActiveDocument, HostError, ModelHost, ensure_document};

/// A recorded host call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    /// `open_document(path, read_only)`.
    Open {
        /// Document path.
        path: PathBuf,
        /// Read-only flag.
        read_only: bool,
    },
    /// `export_active_document(output, interactive)`.
    Export {
        /// Output path.
        output: PathBuf,
        /// Interactive flag.
        interactive: bool,
    },
}

/// Dry-run host. Documents must exist; nothing is written.
#[derive(Debug, Default)]
pub struct DryRunHost {
    active: Option<ActiveDocument>,
    calls: Vec<HostCall>,
}

impl DryRunHost {
    /// Create an empty dry-run host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }
}

#[async_trait]
impl ModelHost for DryRunHost {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn open_document(&mut self, path: &Path, read_only: bool) -> Result<(), HostError> {
        ensure_document(path).await?;
        self.calls.push(HostCall::Open {
            path: path.to_path_buf(),
            read_only,
        });
        self.active = Some(ActiveDocument {
            path: path.to_path_buf(),
            read_only,
        });
        Ok(())
    }

    async fn export_active_document(
        &mut self,
        output: &Path,
        interactive: bool,
    ) -> Result<(), HostError> {
        let document = self.active.as_ref().ok_or(HostError::NoActiveDocument)?;
        info!(
            document = %document.path.display(),
            output = %output.display(),
            "Dry run: export skipped"
        );
        self.calls.push(HostCall::Export {
            output: output.to_path_buf(),
            interactive,
        });
        Ok(())
    }

    fn active_document(&self) -> Option<&ActiveDocument> {
        self.active.as_ref()
    }
}
