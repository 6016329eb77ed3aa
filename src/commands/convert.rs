//! Batch conversion command.

use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;
use validator::Validate;

use crate::output::{self, OutputFormat};
use modelport_converter::converter::BatchOptions;
use modelport_converter::discovery::HostDiscovery;
use modelport_converter::host::{DryRunHost, ModelHost, ProcessHost};
use modelport_converter::progress::ConsoleReporter;
use modelport_converter::report::{BatchReport, EntryResult};
use modelport_converter::{BatchConverter, ConversionError};
use modelport_core::config::AppConfig;
use modelport_core::config::batch::{BatchConfig, FailurePolicy};
use modelport_core::AppResult;
use modelport_core::error::{AppError, ErrorKind};

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Folder holding the source documents (prompted for when omitted)
    pub directory: Option<PathBuf>,

    /// Target format, used verbatim as the output extension
    #[arg(short, long)]
    pub target: Option<String>,

    /// Source extension to select, matched case-sensitively
    #[arg(long)]
    pub source_ext: Option<String>,

    /// Record host calls without launching the host
    #[arg(long)]
    pub dry_run: bool,

    /// Carry on with the next document when one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Keep directory listing order instead of sorting by name
    #[arg(long)]
    pub listing_order: bool,

    /// Never prompt for a folder; without DIRECTORY nothing happens
    #[arg(long)]
    pub no_prompt: bool,

    /// Host timeout in seconds (0 waits indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// One failed document, for the summary table
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Output")]
    output: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&EntryResult> for FailureRow {
    fn from(entry: &EntryResult) -> Self {
        Self {
            source: entry.source_name.clone(),
            output: entry.output_name.clone(),
            error: entry.error.clone().unwrap_or_default(),
        }
    }
}

/// Execute the convert command
pub async fn execute(
    args: &ConvertArgs,
    config: AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let batch = apply_overrides(args, config.batch)?;

    let directory = match &args.directory {
        Some(dir) => Some(dir.clone()),
        None if args.no_prompt => None,
        None => prompt_directory(&batch.source_extension)?,
    };

    let Some(directory) = directory else {
        debug!("No folder selected");
        return Ok(());
    };

    let options = BatchOptions::from(&batch);

    if args.dry_run {
        return run_batch(DryRunHost::new(), options, &directory, &batch, format).await;
    }

    let mut host_config = config.host;
    if let Some(timeout) = args.timeout {
        host_config.timeout_seconds = timeout;
    }
    host_config.validate()?;

    let installation = HostDiscovery::resolve(&host_config).map_err(ConversionError::from)?;
    HostDiscovery::validate(&installation).map_err(ConversionError::from)?;
    debug!(host = %installation.summary(), "Resolved modeling host");

    let host = ProcessHost::new(installation.executable, host_config);
    run_batch(host, options, &directory, &batch, format).await
}

/// Layer command-line flags over the configured batch settings.
fn apply_overrides(args: &ConvertArgs, mut batch: BatchConfig) -> AppResult<BatchConfig> {
    if let Some(target) = &args.target {
        batch.target_format = target.clone();
    }
    if let Some(ext) = &args.source_ext {
        batch.source_extension = ext.clone();
    }
    if args.keep_going {
        batch.failure_policy = FailurePolicy::Continue;
    }
    if args.listing_order {
        batch.sort_entries = false;
    }

    batch
        .validate()
        .map_err(|e| AppError::with_source(ErrorKind::Validation, e.to_string(), e))?;
    Ok(batch)
}

/// Ask for the folder. An empty answer or an interrupted prompt cancels.
fn prompt_directory(source_extension: &str) -> AppResult<Option<PathBuf>> {
    let answer = dialoguer::Input::<String>::new()
        .with_prompt(format!(
            "Select folder of {}s... (empty to cancel)",
            source_extension.trim_start_matches('.').to_uppercase()
        ))
        .allow_empty(true)
        .interact_text();

    match answer {
        Ok(dir) if dir.trim().is_empty() => Ok(None),
        Ok(dir) => Ok(Some(PathBuf::from(dir.trim()))),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(AppError::internal(format!("Input error: {}", e))),
    }
}

/// Run the batch with `host` and report the outcome.
async fn run_batch<H: ModelHost>(
    host: H,
    options: BatchOptions,
    directory: &Path,
    batch: &BatchConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let mut converter = BatchConverter::new(host, options);
    let mut reporter = ConsoleReporter::stdout();

    let Some(report) = converter
        .run(Some(directory), &batch.target_format, &mut reporter)
        .await?
    else {
        return Ok(());
    };

    print_report(&report, format);

    if report.has_failures() {
        return Err(AppError::batch_failed(format!(
            "{} of {} documents failed",
            report.failed_count(),
            report.selected
        )));
    }
    Ok(())
}

fn print_report(report: &BatchReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            if report.has_failures() {
                let rows: Vec<FailureRow> = report.failures().map(FailureRow::from).collect();
                output::print_warning(&format!(
                    "{} converted, {} failed",
                    report.converted_count(),
                    report.failed_count()
                ));
                output::print_list(&rows, format);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::commands::{Cli, Commands};

    fn parse(args: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(args).expect("parse");
        match cli.command {
            Commands::Convert(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults_from_config() {
        let args = parse(&["modelport", "convert", "/models"]);
        let batch = apply_overrides(&args, BatchConfig::default()).expect("valid");
        assert_eq!(batch.target_format, "glb");
        assert_eq!(batch.failure_policy, FailurePolicy::Abort);
        assert!(batch.sort_entries);
        assert_eq!(args.directory, Some(PathBuf::from("/models")));
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "modelport",
            "convert",
            "--target",
            "obj",
            "--source-ext",
            ".3dm",
            "--keep-going",
            "--listing-order",
            "--no-prompt",
        ]);
        let batch = apply_overrides(&args, BatchConfig::default()).expect("valid");
        assert_eq!(batch.target_format, "obj");
        assert_eq!(batch.source_extension, ".3dm");
        assert_eq!(batch.failure_policy, FailurePolicy::Continue);
        assert!(!batch.sort_entries);
        assert!(args.directory.is_none());
    }

    #[test]
    fn test_long_target_passes_through() {
        let target = "x".repeat(40);
        let args = parse(&["modelport", "convert", "-t", &target, "/models"]);
        let batch = apply_overrides(&args, BatchConfig::default()).expect("valid");
        assert_eq!(batch.target_format, target);
    }

    #[test]
    fn test_empty_target_rejected() {
        let args = parse(&["modelport", "convert", "-t", "", "/models"]);
        let err = apply_overrides(&args, BatchConfig::default()).expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_no_prompt_without_directory_is_noop() {
        let args = parse(&["modelport", "convert", "--no-prompt"]);
        let result = execute(&args, AppConfig::default(), OutputFormat::Table).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_failure_row() {
        let entry = EntryResult {
            source_name: "b.skp".to_string(),
            output_name: "b.glb".to_string(),
            status: modelport_converter::report::EntryStatus::Failed,
            error: Some("Host exited with code 2".to_string()),
            duration_ms: 10,
        };
        let row = FailureRow::from(&entry);
        assert_eq!(row.source, "b.skp");
        assert!(row.error.contains("code 2"));
    }
}
