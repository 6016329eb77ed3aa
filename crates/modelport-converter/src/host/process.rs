//! Host driver that launches the host executable as a child process.
//!
//! `open_document` only stages the document; the process is spawned by
//! `export_active_document`, once per document, either with the argument
//! template substituted directly (command mode) or with a generated Ruby
//! startup script (script mode).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use modelport_core::config::host::{HostConfig, HostMode};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::{ActiveDocument, HostError, ModelHost, ensure_document};
use crate::scripting::ScriptingEngine;

/// Maximum number of stderr characters carried in a `ProcessFailed` error.
const STDERR_LIMIT: usize = 2000;

/// Size and modification time of an output file before the host ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputSnapshot {
    len: u64,
    modified: Option<SystemTime>,
}

impl OutputSnapshot {
    /// Snapshot of `path`, or `None` when nothing is there yet.
    async fn take(path: &Path) -> Result<Option<Self>, HostError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Some(Self {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HostError::Io(e)),
        }
    }

    /// Whether the host left a pre-existing file untouched.
    fn unchanged(before: Option<Self>, after: Option<Self>) -> bool {
        match (before, after) {
            (_, None) => true,
            (Some(before), Some(after)) => before.modified.is_some() && before == after,
            (None, Some(_)) => false,
        }
    }
}

/// Captured result of one host invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Standard output from the process (empty when not captured).
    pub stdout: String,
    /// Standard error from the process (empty when not captured).
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Drives a real host executable.
#[derive(Debug)]
pub struct ProcessHost {
    /// Resolved path of the host executable.
    executable: PathBuf,
    /// Host configuration (mode, template, timeout).
    config: HostConfig,
    /// The staged document.
    active: Option<ActiveDocument>,
    /// Output of the most recent invocation.
    last_output: Option<ProcessOutput>,
}

impl ProcessHost {
    /// Create a driver for `executable`.
    pub fn new(executable: PathBuf, config: HostConfig) -> Self {
        Self {
            executable,
            config,
            active: None,
            last_output: None,
        }
    }

    /// The executable this driver launches.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Output captured from the most recent invocation.
    pub fn last_output(&self) -> Option<&ProcessOutput> {
        self.last_output.as_ref()
    }

    /// Substitute template placeholders in arguments.
    pub fn substitute_args(
        template_args: &[String],
        input_path: &Path,
        output_path: &Path,
        read_only: bool,
        script_path: Option<&Path>,
    ) -> Vec<String> {
        let input_str = input_path.to_string_lossy();
        let output_str = output_path.to_string_lossy();
        let input_dir = input_path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        let output_dir = output_path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        let format = output_path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let script = script_path
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        template_args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input_str)
                    .replace("{output}", &output_str)
                    .replace("{format}", &format)
                    .replace("{input_dir}", &input_dir)
                    .replace("{output_dir}", &output_dir)
                    .replace("{stem}", &stem)
                    .replace("{read_only}", if read_only { "true" } else { "false" })
                    .replace("{script}", &script)
            })
            .collect()
    }

    /// Launch the executable and wait for it.
    async fn run(&self, args: &[String], interactive: bool) -> Result<ProcessOutput, HostError> {
        let start = Instant::now();
        let command = self.executable.to_string_lossy().to_string();

        debug!(command = %command, args = ?args, interactive, "Launching host");

        let mut cmd = Command::new(&self.executable);
        cmd.args(args).kill_on_drop(true).stdin(if interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        });

        if self.config.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let child = cmd.spawn().map_err(|source| HostError::Spawn {
            command: command.clone(),
            source,
        })?;

        let output = match self.config.timeout_seconds {
            0 => child.wait_with_output().await?,
            secs => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        error!(command = %command, timeout_seconds = secs, "Host timed out");
                        return Err(HostError::Timeout(secs));
                    }
                }
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let duration_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            return match output.status.code() {
                Some(code) => {
                    error!(
                        command = %command,
                        exit_code = code,
                        stderr = %stderr.chars().take(500).collect::<String>(),
                        "Host failed"
                    );
                    Err(HostError::ProcessFailed {
                        code,
                        stderr: stderr.chars().take(STDERR_LIMIT).collect(),
                    })
                }
                None => {
                    error!(command = %command, "Host was killed by a signal");
                    Err(HostError::Killed)
                }
            };
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: output.status.code(),
            duration_ms,
        })
    }
}

#[async_trait]
impl ModelHost for ProcessHost {
    fn name(&self) -> &str {
        match self.config.mode {
            HostMode::Script => "process:script",
            HostMode::Command => "process:command",
        }
    }

    /// Stage `path` for the next export. `read_only` reaches the host only
    /// through a `{read_only}` placeholder in the argument template.
    async fn open_document(&mut self, path: &Path, read_only: bool) -> Result<(), HostError> {
        ensure_document(path).await?;
        debug!(path = %path.display(), read_only, "Staged active document");
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
        let input = std::path::absolute(&document.path)?;
        let read_only = document.read_only;
        let output = std::path::absolute(output)?;
        let before = OutputSnapshot::take(&output).await?;

        let script = match self.config.mode {
            HostMode::Script => Some(
                ScriptingEngine::write_script(
                    &self.config.effective_script_dir(),
                    &input,
                    &output,
                    self.config.quit_after_export,
                )
                .await?,
            ),
            HostMode::Command => None,
        };

        let args = Self::substitute_args(
            &self.config.args,
            &input,
            &output,
            read_only,
            script.as_deref(),
        );
        let result = self.run(&args, interactive).await;

        if let Some(script) = &script {
            if let Err(e) = tokio::fs::remove_file(script).await {
                warn!(script = %script.display(), error = %e, "Failed to remove startup script");
            }
        }

        let process_output = result?;
        info!(
            output = %output.display(),
            duration_ms = process_output.duration_ms,
            "Host export finished"
        );
        self.last_output = Some(process_output);

        let after = OutputSnapshot::take(&output).await?;
        if OutputSnapshot::unchanged(before, after) {
            if before.is_some() {
                warn!(output = %output.display(), "Host left the existing output untouched");
            }
            return Err(HostError::OutputMissing(output));
        }
        Ok(())
    }

    fn active_document(&self) -> Option<&ActiveDocument> {
        self.active.as_ref()
    }
}
