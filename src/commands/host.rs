//! Modeling host commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use modelport_converter::ConversionError;
use modelport_converter::discovery::HostDiscovery;
use modelport_core::config::AppConfig;
use modelport_core::AppResult;

/// Arguments for host commands
#[derive(Debug, Args)]
pub struct HostArgs {
    /// Host subcommand
    #[command(subcommand)]
    pub command: HostCommand,
}

/// Host subcommands
#[derive(Debug, Subcommand)]
pub enum HostCommand {
    /// Locate the modeling host and check it is usable
    Check,
}

/// Execute a host command
pub async fn execute(args: &HostArgs, config: AppConfig, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        HostCommand::Check => {
            let installation =
                HostDiscovery::resolve(&config.host).map_err(ConversionError::from)?;
            HostDiscovery::validate(&installation).map_err(ConversionError::from)?;

            match format {
                OutputFormat::Json => output::print_json(&installation),
                OutputFormat::Table => {
                    output::print_success("Modeling host found");
                    output::print_kv("Executable", &installation.executable.display().to_string());
                    output::print_kv(
                        "Install directory",
                        &installation.install_dir.display().to_string(),
                    );
                    output::print_kv(
                        "Version",
                        installation.version.as_deref().unwrap_or("unknown"),
                    );
                    output::print_kv("Found via", &installation.discovery_method.to_string());
                    output::print_kv("Mode", &format!("{:?}", config.host.mode).to_lowercase());
                }
            }
            Ok(())
        }
    }
}
