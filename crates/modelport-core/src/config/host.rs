//! External modeling host configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How the host executable is driven for each export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMode {
    /// Generate a Ruby startup script per document and launch the host with it.
    #[default]
    Script,
    /// Invoke the executable directly with the argument template.
    Command,
}

/// Configuration for the external modeling host.
///
/// If `executable` is empty, the host is auto-discovered from the Windows
/// registry, common installation directories, then `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HostConfig {
    /// Path to the host executable. Empty = auto-discover.
    pub executable: PathBuf,

    /// Driver mode.
    pub mode: HostMode,

    /// Argument template. Placeholders: `{input}`, `{output}`, `{format}`,
    /// `{input_dir}`, `{output_dir}`, `{stem}`, `{read_only}` and, in script
    /// mode, `{script}`.
    #[validate(length(min = 1))]
    pub args: Vec<String>,

    /// Executable names looked up on `PATH` during discovery.
    #[validate(length(min = 1))]
    pub search_names: Vec<String>,

    /// Timeout for one host invocation in seconds. `0` waits indefinitely.
    #[validate(range(max = 86_400))]
    pub timeout_seconds: u64,

    /// Whether to capture the host's stdout/stderr for diagnostics.
    pub capture_output: bool,

    /// Directory for generated startup scripts. Defaults to the system temp dir.
    pub script_dir: Option<PathBuf>,

    /// Append a quit instruction to generated scripts.
    pub quit_after_export: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::new(),
            mode: HostMode::default(),
            args: default_args(),
            search_names: default_search_names(),
            timeout_seconds: 0,
            capture_output: true,
            script_dir: None,
            quit_after_export: true,
        }
    }
}

fn default_args() -> Vec<String> {
    vec!["-RubyStartup".to_string(), "{script}".to_string()]
}

fn default_search_names() -> Vec<String> {
    vec!["SketchUp".to_string(), "sketchup".to_string()]
}

impl HostConfig {
    /// Resolve the effective script directory.
    pub fn effective_script_dir(&self) -> PathBuf {
        self.script_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("modelport"))
    }

    /// Whether an explicit executable path was configured.
    pub fn has_explicit_executable(&self) -> bool {
        !self.executable.as_os_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert!(!config.has_explicit_executable());
        assert_eq!(config.mode, HostMode::Script);
        assert_eq!(config.timeout_seconds, 0);
        assert!(config.args.iter().any(|a| a == "{script}"));
    }

    #[test]
    fn test_command_mode_from_toml() {
        let config: HostConfig = toml::from_str(
            "mode = \"command\"\nexecutable = \"/opt/conv/bin/convert\"\nargs = [\"{input}\", \"{output}\"]\n",
        )
        .expect("parse");
        assert_eq!(config.mode, HostMode::Command);
        assert!(config.has_explicit_executable());
        assert_eq!(config.args.len(), 2);
        assert!(config.capture_output);
    }

    #[test]
    fn test_empty_args_rejected() {
        let config = HostConfig {
            args: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
