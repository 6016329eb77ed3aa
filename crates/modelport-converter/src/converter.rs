//! Batch converter: selects source documents in a directory and drives the
//! host's open/export pair over each of them, one at a time.

use std::path::Path;
use std::time::Instant;

use modelport_core::config::batch::{BatchConfig, FailurePolicy};
use tracing::{debug, error, info, instrument, warn};

use crate::error::ConversionError;
use crate::filesystem::{ensure_directory, list_source_names};
use crate::host::ModelHost;
use crate::models::{ConversionEntry, ConversionJob, normalize_directory};
use crate::progress::ProgressReporter;
use crate::report::BatchReport;
use crate::workdir::WorkingDirGuard;

/// Selection and failure options for a run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Literal, case-sensitive suffix selecting source documents.
    pub source_extension: String,
    /// Sort entries by name instead of keeping listing order.
    pub sort_entries: bool,
    /// What to do when an entry fails.
    pub failure_policy: FailurePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            source_extension: config.source_extension.clone(),
            sort_entries: config.sort_entries,
            failure_policy: config.failure_policy,
        }
    }
}

/// Drives a [`ModelHost`] over every matching document of a directory.
#[derive(Debug)]
pub struct BatchConverter<H: ModelHost> {
    host: H,
    options: BatchOptions,
}

impl<H: ModelHost> BatchConverter<H> {
    /// Create a converter over `host`.
    pub fn new(host: H, options: BatchOptions) -> Self {
        Self { host, options }
    }

    /// The host driver.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Consume the converter and return the host driver.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Run the batch over `directory`.
    ///
    /// A missing or empty `directory` is a silent no-op returning `Ok(None)`:
    /// nothing is listed, no host call is made and nothing is reported.
    ///
    /// Otherwise the working directory is switched to `directory` for the
    /// duration of the run and restored on every exit path. Under
    /// [`FailurePolicy::Abort`] the first failing entry ends the run with its
    /// error; under [`FailurePolicy::Continue`] failures are recorded in the
    /// returned report and the run goes on.
    #[instrument(skip(self, directory, reporter), fields(host = self.host.name()))]
    pub async fn run(
        &mut self,
        directory: Option<&Path>,
        target_format: &str,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Option<BatchReport>, ConversionError> {
        let Some(raw) = directory.filter(|d| !d.as_os_str().is_empty()) else {
            debug!("No directory selected, nothing to do");
            return Ok(None);
        };

        if target_format.is_empty() {
            return Err(ConversionError::EmptyTargetFormat);
        }

        let started = Instant::now();
        let dir = normalize_directory(raw);
        ensure_directory(&dir).await?;
        reporter.directory(&dir);

        let _cwd = WorkingDirGuard::enter(&dir)?;

        let names = list_source_names(
            Path::new("."),
            &self.options.source_extension,
            self.options.sort_entries,
        )
        .await?;
        let job = ConversionJob::from_names(
            dir,
            &self.options.source_extension,
            target_format,
            names,
        );
        info!(
            directory = %job.source_directory.display(),
            entries = job.len(),
            target_format,
            "Selected source documents"
        );

        let mut report = BatchReport::new(&job, self.host.name());
        for entry in &job.entries {
            reporter.entry(entry);
            let entry_started = Instant::now();

            match self.convert_entry(entry).await {
                Ok(()) => report.record_success(entry, entry_started.elapsed()),
                // Under abort the error is returned to the caller, which reports it.
                Err(err) => match self.options.failure_policy {
                    FailurePolicy::Abort => {
                        error!(entry = %entry.source_name, error = %err, "Aborting batch");
                        return Err(err);
                    }
                    FailurePolicy::Continue => {
                        warn!(entry = %entry.source_name, error = %err, "Entry failed, continuing");
                        reporter.entry_failed(entry, &err);
                        report.record_failure(entry, &err, entry_started.elapsed());
                    }
                },
            }
        }

        report.finish(started.elapsed());
        info!(
            converted = report.converted_count(),
            failed = report.failed_count(),
            duration_ms = report.total_duration_ms,
            "Batch finished"
        );
        reporter.done(&report);
        Ok(Some(report))
    }

    /// Open one document and export it, both non-interactively.
    async fn convert_entry(&mut self, entry: &ConversionEntry) -> Result<(), ConversionError> {
        self.host
            .open_document(Path::new(&entry.source_name), false)
            .await
            .map_err(|e| ConversionError::host(&entry.source_name, e))?;

        self.host
            .export_active_document(Path::new(&entry.output_name), false)
            .await
            .map_err(|e| ConversionError::host(&entry.source_name, e))
    }
}
