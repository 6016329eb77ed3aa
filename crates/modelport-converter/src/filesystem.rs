//! Directory listing for batch selection.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::models::matches_source;

/// Check that `dir` exists and is a directory.
pub async fn ensure_directory(dir: &Path) -> Result<(), ConversionError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConversionError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConversionError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => Err(ConversionError::Io(e)),
    }
}

/// List immediate (non-recursive) file names in `dir` ending with
/// `source_extension`.
///
/// Directories, dangling links and non-UTF-8 names are never selected. The
/// listing order is kept unless `sort` is set. Listing does not modify the
/// directory.
pub async fn list_source_names(
    dir: &Path,
    source_extension: &str,
    sort: bool,
) -> Result<Vec<String>, ConversionError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(name = ?entry.file_name(), "Skipping entry with non-UTF-8 name");
            continue;
        };

        if !matches_source(&name, source_extension) {
            continue;
        }

        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_dir() => {
                debug!(name = %name, "Skipping directory with source extension");
            }
            Ok(_) => names.push(name),
            Err(e) => {
                debug!(name = %name, error = %e, "Skipping unreadable entry");
            }
        }
    }

    if sort {
        names.sort();
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"x").expect("write");
        }
    }

    #[tokio::test]
    async fn test_lists_matching_files_only() {
        let temp = tempfile::tempdir().expect("tempdir");
        populate(temp.path(), &["shed.skp", "house.skp", "notes.txt", "Barn.SKP"]);
        std::fs::create_dir(temp.path().join("folder.skp")).expect("mkdir");
        std::fs::create_dir(temp.path().join("nested")).expect("mkdir");
        populate(&temp.path().join("nested"), &["deep.skp"]);

        let names = list_source_names(temp.path(), ".skp", true)
            .await
            .expect("list");
        assert_eq!(names, vec!["house.skp", "shed.skp"]);
    }

    #[tokio::test]
    async fn test_listing_is_repeatable() {
        let temp = tempfile::tempdir().expect("tempdir");
        populate(temp.path(), &["a.skp", "b.skp", "c.txt"]);

        let first = list_source_names(temp.path(), ".skp", false)
            .await
            .expect("list");
        let second = list_source_names(temp.path(), ".skp", false)
            .await
            .expect("list");
        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(temp.path()).expect("dir").count(), 3);
    }

    #[tokio::test]
    async fn test_ensure_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(ensure_directory(temp.path()).await.is_ok());

        let file = temp.path().join("a.skp");
        std::fs::write(&file, b"x").expect("write");
        assert!(matches!(
            ensure_directory(&file).await,
            Err(ConversionError::NotADirectory { .. })
        ));
        assert!(matches!(
            ensure_directory(&temp.path().join("missing")).await,
            Err(ConversionError::DirectoryNotFound { .. })
        ));
    }
}
