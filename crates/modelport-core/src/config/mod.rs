//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section falls back to its defaults when absent.

pub mod batch;
pub mod host;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use self::batch::BatchConfig;
use self::host::HostConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable prefix for overrides (`MODELPORT__BATCH__TARGET_FORMAT=obj`).
pub const ENV_PREFIX: &str = "MODELPORT";

/// Location of the optional project-level defaults file, without extension.
pub const DEFAULT_CONFIG_STEM: &str = "config/default";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// External modeling host settings.
    #[validate(nested)]
    pub host: HostConfig,
    /// Batch selection and failure handling.
    #[validate(nested)]
    pub batch: BatchConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges, in increasing precedence: `config/default.toml` (optional),
    /// the file given by `path` (required when provided), and environment
    /// variables prefixed with `MODELPORT__`. The merged result is validated.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_STEM).required(false));

        if let Some(path) = path {
            debug!(path = %path.display(), "Adding configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.source_extension, ".skp");
        assert_eq!(config.batch.target_format, "glb");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("modelport.toml");
        std::fs::write(
            &path,
            "[batch]\ntarget_format = \"obj\"\nfailure_policy = \"continue\"\n",
        )
        .expect("write");

        let config = AppConfig::load(Some(&path)).expect("load");
        assert_eq!(config.batch.target_format, "obj");
        assert_eq!(config.batch.failure_policy, batch::FailurePolicy::Continue);
        assert_eq!(config.batch.source_extension, ".skp");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/modelport.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_invalid_extension() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[batch]\nsource_extension = \"skp\"\n").expect("write");

        let err = AppConfig::load(Some(&path)).expect_err("should fail validation");
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.host.args, config.host.args);
        assert_eq!(parsed.batch.sort_entries, config.batch.sort_entries);
    }
}
