//! Configuration commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use modelport_core::config::AppConfig;
use modelport_core::{AppError, AppResult};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Validate the layered configuration
    Validate,
    /// Write a configuration file holding every default
    Generate {
        /// Output path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: PathBuf,
    },
}

/// Execute a config command
pub async fn execute(
    args: &ConfigArgs,
    config: AppResult<AppConfig>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let config = config?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => println!("{}", render_toml(&config)?),
            }
            Ok(())
        }
        ConfigCommand::Validate => {
            let source = config_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string());
            match config {
                Ok(config) => {
                    output::print_success(&format!("Configuration is valid ({source})"));
                    output::print_kv("Source extension", &config.batch.source_extension);
                    output::print_kv("Target format", &config.batch.target_format);
                    output::print_kv(
                        "Host executable",
                        &if config.host.has_explicit_executable() {
                            config.host.executable.display().to_string()
                        } else {
                            "auto-discover".to_string()
                        },
                    );
                    Ok(())
                }
                Err(e) => {
                    output::print_error(&format!("Configuration is invalid ({source})"));
                    Err(e)
                }
            }
        }
        ConfigCommand::Generate { output: path } => {
            let rendered = render_toml(&AppConfig::default())?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, rendered).await?;
            output::print_success(&format!("Configuration written to {}", path.display()));
            Ok(())
        }
    }
}

fn render_toml(config: &AppConfig) -> AppResult<String> {
    toml::to_string_pretty(config)
        .map_err(|e| AppError::internal(format!("Failed to serialize config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: ConfigCommand) -> ConfigArgs {
        ConfigArgs { command }
    }

    #[tokio::test]
    async fn test_generate_writes_loadable_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/modelport.toml");

        execute(
            &args(ConfigCommand::Generate {
                output: path.clone(),
            }),
            Ok(AppConfig::default()),
            None,
            OutputFormat::Table,
        )
        .await
        .expect("generate");

        let text = std::fs::read_to_string(&path).expect("read");
        let parsed: AppConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.batch.target_format, "glb");
        assert_eq!(parsed.batch.source_extension, ".skp");
    }

    #[tokio::test]
    async fn test_validate_propagates_load_error() {
        let result = execute(
            &args(ConfigCommand::Validate),
            Err(AppError::configuration("bad")),
            Some(Path::new("broken.toml")),
            OutputFormat::Table,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_show_valid_config() {
        let result = execute(
            &args(ConfigCommand::Show),
            Ok(AppConfig::default()),
            None,
            OutputFormat::Json,
        )
        .await;
        assert!(result.is_ok());
    }
}
