//! Domain models: conversion jobs, entries and the naming rules.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Normalize path separators to forward slashes.
///
/// Non-UTF-8 paths are returned unchanged.
pub fn normalize_directory(raw: &Path) -> PathBuf {
    match raw.to_str() {
        Some(s) => PathBuf::from(s.replace('\\', "/")),
        None => raw.to_path_buf(),
    }
}

/// Whether `name` carries the source extension (literal, case-sensitive).
pub fn matches_source(name: &str, source_extension: &str) -> bool {
    name.ends_with(source_extension)
}

/// Derive the output name by replacing the trailing source extension.
///
/// Only the final occurrence is replaced: `a.skp.skp` becomes `a.skp.glb`.
/// Returns `None` when `name` does not end with `source_extension`.
pub fn output_name(name: &str, source_extension: &str, target_format: &str) -> Option<String> {
    name.strip_suffix(source_extension)
        .map(|stem| format!("{stem}.{target_format}"))
}

/// One source document and the name it is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionEntry {
    /// Source file name, relative to the job directory.
    pub source_name: String,
    /// Output file name, relative to the job directory.
    pub output_name: String,
}

/// A batch conversion job.
///
/// Entries are captured once when the job is built; the directory is not
/// re-scanned while the job runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Directory holding the source documents (separators normalized).
    pub source_directory: PathBuf,
    /// Output extension handed to the host.
    pub target_format: String,
    /// Literal source suffix used for selection.
    pub source_extension: String,
    /// Selected entries, in processing order.
    pub entries: Vec<ConversionEntry>,
}

impl ConversionJob {
    /// Build a job from directory entry names, keeping only those that
    /// carry the source extension.
    pub fn from_names<I, S>(
        source_directory: PathBuf,
        source_extension: &str,
        target_format: &str,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                output_name(name, source_extension, target_format).map(|output| {
                    ConversionEntry {
                        source_name: name.to_string(),
                        output_name: output,
                    }
                })
            })
            .collect();

        Self {
            source_directory,
            target_format: target_format.to_string(),
            source_extension: source_extension.to_string(),
            entries,
        }
    }

    /// Number of selected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_directory() {
        assert_eq!(
            normalize_directory(Path::new(r"C:\Users\me\Models")),
            PathBuf::from("C:/Users/me/Models")
        );
        assert_eq!(normalize_directory(Path::new("/srv/models")), PathBuf::from("/srv/models"));
    }

    #[test]
    fn test_matches_source_is_case_sensitive() {
        assert!(matches_source("house.skp", ".skp"));
        assert!(!matches_source("house.SKP", ".skp"));
        assert!(!matches_source("house.skpx", ".skp"));
        assert!(!matches_source("houseskp", ".skp"));
        assert!(!matches_source("house.skp.bak", ".skp"));
    }

    #[test]
    fn test_output_name_replaces_final_suffix_only() {
        assert_eq!(output_name("model.skp", ".skp", "glb").as_deref(), Some("model.glb"));
        assert_eq!(output_name("a.skp.skp", ".skp", "glb").as_deref(), Some("a.skp.glb"));
        assert_eq!(output_name("notes.txt", ".skp", "glb"), None);
    }

    #[test]
    fn test_target_format_used_verbatim() {
        assert_eq!(
            output_name("house.skp", ".skp", "DAE").as_deref(),
            Some("house.DAE")
        );
    }

    #[test]
    fn test_job_filters_names() {
        let job = ConversionJob::from_names(
            PathBuf::from("/models"),
            ".skp",
            "obj",
            ["house.skp", "shed.skp", "notes.txt", "House.SKP"],
        );
        assert_eq!(job.len(), 2);
        assert_eq!(job.entries[0].source_name, "house.skp");
        assert_eq!(job.entries[0].output_name, "house.obj");
        assert_eq!(job.entries[1].output_name, "shed.obj");
    }

    #[test]
    fn test_job_selection_is_exact() {
        let names = ["a.skp", "b.skb", "c.skp~", ".skp", "d.skp.skp", "e"];
        let job = ConversionJob::from_names(PathBuf::from("."), ".skp", "glb", names);
        let selected: Vec<&str> = job.entries.iter().map(|e| e.source_name.as_str()).collect();
        let expected: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| n.ends_with(".skp"))
            .collect();
        assert_eq!(selected, expected);
    }

    #[test]
    fn test_empty_job() {
        let job = ConversionJob::from_names(PathBuf::from("."), ".skp", "glb", Vec::<String>::new());
        assert!(job.is_empty());
    }
}
