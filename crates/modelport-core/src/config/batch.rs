//! Batch selection and failure-handling configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// What a batch does when opening or exporting one entry fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and propagate it.
    #[default]
    Abort,
    /// Record the failure, move on to the next entry, fail the run at the end.
    Continue,
}

/// Batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BatchConfig {
    /// Literal, case-sensitive suffix selecting source documents.
    #[validate(custom(function = "validate_source_extension"))]
    pub source_extension: String,

    /// Default output extension handed to the host's export.
    #[validate(length(min = 1))]
    pub target_format: String,

    /// Sort selected entries by name instead of keeping listing order.
    pub sort_entries: bool,

    /// Behaviour on a failed entry.
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            target_format: default_target_format(),
            sort_entries: true,
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_source_extension() -> String {
    ".skp".to_string()
}

fn default_target_format() -> String {
    "glb".to_string()
}

/// A source extension is a dot followed by at least one non-separator character.
fn validate_source_extension(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() > 1
        && value.starts_with('.')
        && !value.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("source_extension")
            .with_message("must start with '.' and contain no path separators".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_validation() {
        assert!(validate_source_extension(".skp").is_ok());
        assert!(validate_source_extension(".3dm").is_ok());
        assert!(validate_source_extension("skp").is_err());
        assert!(validate_source_extension(".").is_err());
        assert!(validate_source_extension("./skp").is_err());
    }

    #[test]
    fn test_empty_target_rejected() {
        let config = BatchConfig {
            target_format: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_long_target_accepted_verbatim() {
        let config = BatchConfig {
            target_format: "a".repeat(33),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_failure_policy_parses_snake_case() {
        let config: BatchConfig =
            toml::from_str("failure_policy = \"continue\"").expect("parse");
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(config.sort_entries);
    }
}
