//! Ruby startup script generation for script-mode hosts.
//!
//! The host is launched once per document with a script that opens the
//! document, exports the active model without showing the export summary,
//! and optionally quits. Both calls return false on failure; the script
//! then leaves the host with exit status 1.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::host::HostError;

/// Generates host startup scripts.
pub struct ScriptingEngine;

impl ScriptingEngine {
    /// Render the script text for one open/export pair.
    pub fn render(document: &Path, output: &Path, quit: bool) -> Result<String, HostError> {
        let mut lines = vec![
            format!(
                "Sketchup.open_file({}) or exit!(1)",
                Self::ruby_string_literal(document)?
            ),
            format!(
                "Sketchup.active_model.export({}, false) or exit!(1)",
                Self::ruby_string_literal(output)?
            ),
        ];
        if quit {
            lines.push("Sketchup.quit".to_string());
        }
        Ok(lines.join("\n") + "\n")
    }

    /// Write a uniquely named script into `dir` and return its path.
    pub async fn write_script(
        dir: &Path,
        document: &Path,
        output: &Path,
        quit: bool,
    ) -> Result<PathBuf, HostError> {
        let content = Self::render(document, output, quit)?;

        tokio::fs::create_dir_all(dir).await?;
        let script_path = dir.join(format!("export__{}.rb", Uuid::now_v7().simple()));

        let mut file = tokio::fs::File::create(&script_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(script_path)
    }

    /// Single-quoted Ruby literal with forward slashes.
    fn ruby_string_literal(path: &Path) -> Result<String, HostError> {
        let s = path
            .to_str()
            .ok_or_else(|| HostError::InvalidUtf8Path(path.to_path_buf()))?;
        let escaped = s.replace('\\', "/").replace('\'', "\\'");
        Ok(format!("'{escaped}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_open_then_export() {
        let script = ScriptingEngine::render(
            Path::new("/models/house.skp"),
            Path::new("/models/house.glb"),
            true,
        )
        .expect("render");
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "Sketchup.open_file('/models/house.skp') or exit!(1)");
        assert_eq!(
            lines[1],
            "Sketchup.active_model.export('/models/house.glb', false) or exit!(1)"
        );
        assert_eq!(lines[2], "Sketchup.quit");
    }

    #[test]
    fn test_render_without_quit() {
        let script =
            ScriptingEngine::render(Path::new("a.skp"), Path::new("a.obj"), false).expect("ok");
        assert_eq!(script.lines().count(), 2);
    }

    #[test]
    fn test_backslashes_and_quotes_escaped() {
        let script = ScriptingEngine::render(
            Path::new(r"C:\Work\bob's shed.skp"),
            Path::new(r"C:\Work\bob's shed.glb"),
            false,
        )
        .expect("render");
        assert!(script.contains(r"'C:/Work/bob\'s shed.skp'"));
    }

    #[tokio::test]
    async fn test_write_script_unique_names() {
        let temp = tempfile::tempdir().expect("tempdir");
        let a = ScriptingEngine::write_script(
            temp.path(),
            Path::new("a.skp"),
            Path::new("a.glb"),
            true,
        )
        .await
        .expect("write");
        let b = ScriptingEngine::write_script(
            temp.path(),
            Path::new("a.skp"),
            Path::new("a.glb"),
            true,
        )
        .await
        .expect("write");
        assert_ne!(a, b);
        let content = std::fs::read_to_string(&a).expect("read");
        assert!(content.contains("Sketchup.open_file('a.skp')"));
    }
}
