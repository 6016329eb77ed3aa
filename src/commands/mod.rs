//! CLI command definitions and dispatch.

pub mod config;
pub mod convert;
pub mod host;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use modelport_core::config::AppConfig;
use modelport_core::AppResult;

/// Batch-convert a folder of models through the modeling host
#[derive(Debug, Parser)]
#[command(name = "modelport", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file layered over config/default.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert every matching document in a folder
    Convert(convert::ConvertArgs),
    /// Modeling host discovery
    Host(host::HostArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// `config` is the result of loading configuration; commands that need
    /// a valid configuration propagate a load failure.
    pub async fn execute(&self, config: AppResult<AppConfig>) -> AppResult<()> {
        match &self.command {
            Commands::Convert(args) => convert::execute(args, config?, self.format).await,
            Commands::Host(args) => host::execute(args, config?, self.format).await,
            Commands::Config(args) => {
                config::execute(args, config, self.config.as_deref(), self.format).await
            }
        }
    }
}
