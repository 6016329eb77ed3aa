//! ModelPort: batch conversion of host-native model files.
//!
//! Entry point: parses arguments, loads configuration, initialises logging
//! and dispatches the selected command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use modelport_core::config::AppConfig;
use modelport_core::config::logging::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref());
    let default_logging = LoggingConfig::default();
    init_logging(
        config
            .as_ref()
            .map(|c| &c.logging)
            .unwrap_or(&default_logging),
    );

    if let Err(e) = cli.execute(config).await {
        tracing::debug!(kind = %e.kind, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Logs go to stderr; stdout carries progress.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        "pretty" => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .compact()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
