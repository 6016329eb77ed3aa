//! Scoped change of the process working directory.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Changes the working directory and restores the previous one on drop.
///
/// Restoration also happens when the holder returns early with an error or
/// unwinds from a panic.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    /// Record the current directory, then change into `dir`.
    pub fn enter(dir: &Path) -> std::io::Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        debug!(from = %original.display(), to = %dir.display(), "Changed working directory");
        Ok(Self { original })
    }

    /// The directory restored on drop.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        match std::env::set_current_dir(&self.original) {
            Ok(()) => debug!(dir = %self.original.display(), "Restored working directory"),
            Err(e) => error!(
                dir = %self.original.display(),
                error = %e,
                "Failed to restore working directory"
            ),
        }
    }
}
