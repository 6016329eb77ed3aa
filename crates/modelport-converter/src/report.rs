//! Per-run batch report: per-entry outcomes, counters and durations.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::models::{ConversionEntry, ConversionJob};

/// Outcome of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Opened and exported.
    Converted,
    /// Open or export failed.
    Failed,
}

/// Result for a single entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResult {
    /// Source file name.
    pub source_name: String,
    /// Output file name.
    pub output_name: String,
    /// Outcome.
    pub status: EntryStatus,
    /// Error message if failed.
    pub error: Option<String>,
    /// Duration of open + export in milliseconds.
    pub duration_ms: u64,
}

/// Report of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Directory the batch ran in.
    pub source_directory: PathBuf,
    /// Output extension.
    pub target_format: String,
    /// Name of the host driver.
    pub host: String,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// Number of entries selected at job start.
    pub selected: usize,
    /// Results for the entries that were attempted, in order.
    pub entries: Vec<EntryResult>,
    /// Total wall-clock duration in milliseconds.
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// Start a report for `job`.
    pub fn new(job: &ConversionJob, host: &str) -> Self {
        Self {
            source_directory: job.source_directory.clone(),
            target_format: job.target_format.clone(),
            host: host.to_string(),
            started_at: Utc::now(),
            selected: job.len(),
            entries: Vec::with_capacity(job.len()),
            total_duration_ms: 0,
        }
    }

    /// Record a converted entry.
    pub fn record_success(&mut self, entry: &ConversionEntry, duration: Duration) {
        self.entries.push(EntryResult {
            source_name: entry.source_name.clone(),
            output_name: entry.output_name.clone(),
            status: EntryStatus::Converted,
            error: None,
            duration_ms: duration.as_millis() as u64,
        });
    }

    /// Record a failed entry.
    pub fn record_failure(
        &mut self,
        entry: &ConversionEntry,
        error: &ConversionError,
        duration: Duration,
    ) {
        self.entries.push(EntryResult {
            source_name: entry.source_name.clone(),
            output_name: entry.output_name.clone(),
            status: EntryStatus::Failed,
            error: Some(error.to_string()),
            duration_ms: duration.as_millis() as u64,
        });
    }

    /// Close the report with the total run duration.
    pub fn finish(&mut self, total: Duration) {
        self.total_duration_ms = total.as_millis() as u64;
    }

    /// Number of converted entries.
    pub fn converted_count(&self) -> usize {
        self.count(EntryStatus::Converted)
    }

    /// Number of failed entries.
    pub fn failed_count(&self) -> usize {
        self.count(EntryStatus::Failed)
    }

    /// Whether any entry failed.
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Failed entries, in order.
    pub fn failures(&self) -> impl Iterator<Item = &EntryResult> {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
    }

    fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}
