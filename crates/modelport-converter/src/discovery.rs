//! Modeling host installation discovery and validation.
//!
//! Locates the host executable by querying, in order:
//! 1. The explicitly configured path
//! 2. The Windows registry (`SOFTWARE\SketchUp\SketchUp <year>`), newest first
//! 3. Common versioned installation directories, newest first
//! 4. The system PATH
//!
//! On non-Windows platforms the registry step is skipped.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use modelport_core::config::host::HostConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Vendor directory / registry key under which versioned installs live.
const VENDOR_DIR: &str = "SketchUp";

/// Prefix of versioned installation directory names (`SketchUp 2024`).
const VERSIONED_PREFIX: &str = "SketchUp ";

/// Errors from host discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No installation was found anywhere.
    #[error("Modeling host not found. Searched: registry, common paths, and PATH for {names}")]
    NotFound {
        /// The executable names that were searched for.
        names: String,
    },

    /// A directory was given but does not contain the executable.
    #[error("Install directory {install_dir} does not contain any of: {names}")]
    ExecutableMissing {
        /// The directory that was searched.
        install_dir: PathBuf,
        /// The executable names that were searched for.
        names: String,
    },

    /// Registry access failed (Windows only).
    #[error("Failed to access Windows registry: {reason}")]
    RegistryError {
        /// Description of the failure.
        reason: String,
    },
}

/// How the host installation was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Explicitly configured by the user.
    ExplicitConfig,
    /// Found via the Windows registry.
    WindowsRegistry,
    /// Found in a common installation directory.
    CommonPath,
    /// Found via the system PATH environment variable.
    SystemPath,
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ExplicitConfig => "explicit config",
            Self::WindowsRegistry => "registry",
            Self::CommonPath => "common path",
            Self::SystemPath => "system PATH",
        };
        f.write_str(label)
    }
}

/// A discovered host installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInstallation {
    /// Full path to the host executable.
    pub executable: PathBuf,
    /// Installation directory.
    pub install_dir: PathBuf,
    /// Version label taken from the install directory or registry key.
    pub version: Option<String>,
    /// How the installation was discovered.
    pub discovery_method: DiscoveryMethod,
}

impl HostInstallation {
    fn new(executable: PathBuf, version: Option<String>, method: DiscoveryMethod) -> Self {
        let install_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| executable.clone());
        Self {
            executable,
            install_dir,
            version,
            discovery_method: method,
        }
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} v{} (found via {})",
            self.executable.display(),
            self.version.as_deref().unwrap_or("unknown"),
            self.discovery_method
        )
    }
}

/// Host discovery engine.
#[derive(Debug, Clone)]
pub struct HostDiscovery {
    /// Executable base names, without platform suffix.
    names: Vec<String>,
}

impl HostDiscovery {
    /// Create a discovery engine looking for `names`.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Resolve the executable for `config`.
    ///
    /// An explicitly configured path wins when it is valid; an invalid one
    /// is reported and auto-discovery is attempted instead.
    pub fn resolve(config: &HostConfig) -> Result<HostInstallation, DiscoveryError> {
        let discovery = Self::new(config.search_names.clone());

        if config.has_explicit_executable() {
            match discovery.from_explicit_path(&config.executable) {
                Ok(installation) => {
                    info!(
                        path = %installation.executable.display(),
                        "Using explicitly configured host executable"
                    );
                    return Ok(installation);
                }
                Err(e) => {
                    warn!(
                        configured_path = %config.executable.display(),
                        error = %e,
                        "Configured host path is invalid, attempting auto-discovery"
                    );
                }
            }
        }

        discovery.discover()
    }

    /// Attempt auto-discovery.
    pub fn discover(&self) -> Result<HostInstallation, DiscoveryError> {
        info!("Searching for modeling host installation...");

        #[cfg(windows)]
        {
            match self.discover_from_registry() {
                Ok(installation) => {
                    info!(
                        path = %installation.executable.display(),
                        version = ?installation.version,
                        "Found host via Windows registry"
                    );
                    return Ok(installation);
                }
                Err(e) => {
                    debug!(error = %e, "Registry discovery failed, trying fallbacks");
                }
            }
        }

        for root in Self::common_install_roots() {
            if let Some(installation) = self.find_in_versioned_root(&root) {
                info!(
                    path = %installation.executable.display(),
                    "Found host in common installation path"
                );
                return Ok(installation);
            }
        }
        debug!("Common path discovery failed, trying PATH");

        let path_var = std::env::var_os("PATH").unwrap_or_default();
        if let Some(installation) = self.find_on_path(&path_var) {
            info!(
                path = %installation.executable.display(),
                "Found host in system PATH"
            );
            return Ok(installation);
        }

        Err(DiscoveryError::NotFound {
            names: self.names.join(", "),
        })
    }

    /// Discover the host from the Windows registry, newest version first.
    #[cfg(windows)]
    fn discover_from_registry(&self) -> Result<HostInstallation, DiscoveryError> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};

        let roots = [(HKEY_LOCAL_MACHINE, "HKLM"), (HKEY_CURRENT_USER, "HKCU")];
        let vendor_key = format!(r"SOFTWARE\{VENDOR_DIR}");

        for (root_key, root_name) in &roots {
            let vendor = match RegKey::predef(*root_key).open_subkey_with_flags(&vendor_key, KEY_READ)
            {
                Ok(key) => key,
                Err(e) => {
                    debug!(root = root_name, error = %e, "Cannot open vendor registry key");
                    continue;
                }
            };

            let mut versions: Vec<String> = vendor
                .enum_keys()
                .filter_map(Result::ok)
                .filter(|k| k.starts_with(VERSIONED_PREFIX))
                .collect();
            versions.sort();

            for version_key in versions.iter().rev() {
                let Ok(key) = vendor.open_subkey_with_flags(version_key, KEY_READ) else {
                    continue;
                };
                let Ok(location) = key.get_value::<String, _>("InstallLocation") else {
                    continue;
                };
                let dir = PathBuf::from(location);
                if let Some(executable) = self.find_executable_in(&dir) {
                    let version = version_key.strip_prefix(VERSIONED_PREFIX).map(str::to_string);
                    return Ok(HostInstallation::new(
                        executable,
                        version,
                        DiscoveryMethod::WindowsRegistry,
                    ));
                }
                debug!(
                    root = root_name,
                    install_dir = %dir.display(),
                    "Registry install location has no executable"
                );
            }
        }

        Err(DiscoveryError::RegistryError {
            reason: format!("No usable {VENDOR_DIR} entry in HKLM or HKCU"),
        })
    }

    /// Roots that contain versioned installation directories.
    fn common_install_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();

        #[cfg(windows)]
        {
            for var in ["ProgramFiles", "ProgramFiles(x86)"] {
                if let Some(pf) = std::env::var_os(var) {
                    roots.push(PathBuf::from(pf).join(VENDOR_DIR));
                }
            }
            roots.push(PathBuf::from("C:/Program Files").join(VENDOR_DIR));
        }

        #[cfg(target_os = "macos")]
        {
            roots.push(PathBuf::from("/Applications"));
        }

        roots
    }

    /// Search `root` for `SketchUp <version>` directories, newest first.
    pub fn find_in_versioned_root(&self, root: &Path) -> Option<HostInstallation> {
        let entries = std::fs::read_dir(root).ok()?;

        let mut versioned: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let version = name.strip_prefix(VERSIONED_PREFIX)?.to_string();
                entry.path().is_dir().then(|| (version, entry.path()))
            })
            .collect();
        versioned.sort_by(|a, b| b.0.cmp(&a.0));

        versioned.into_iter().find_map(|(version, dir)| {
            let app_bundle = dir.join(format!("{VENDOR_DIR}.app")).join("Contents/MacOS");
            self.find_executable_in(&dir)
                .or_else(|| self.find_executable_in(&app_bundle))
                .map(|exe| HostInstallation::new(exe, Some(version), DiscoveryMethod::CommonPath))
        })
    }

    /// Search every directory of a `PATH`-style value.
    pub fn find_on_path(&self, path_var: &OsStr) -> Option<HostInstallation> {
        std::env::split_paths(path_var).find_map(|dir| {
            self.find_executable_in(&dir)
                .map(|exe| HostInstallation::new(exe, None, DiscoveryMethod::SystemPath))
        })
    }

    /// Build an installation from an explicitly configured file or directory.
    pub fn from_explicit_path(&self, path: &Path) -> Result<HostInstallation, DiscoveryError> {
        if path.is_file() {
            return Ok(HostInstallation::new(
                path.to_path_buf(),
                None,
                DiscoveryMethod::ExplicitConfig,
            ));
        }

        if path.is_dir() {
            return self
                .find_executable_in(path)
                .map(|exe| HostInstallation::new(exe, None, DiscoveryMethod::ExplicitConfig))
                .ok_or_else(|| DiscoveryError::ExecutableMissing {
                    install_dir: path.to_path_buf(),
                    names: self.names.join(", "),
                });
        }

        Err(DiscoveryError::NotFound {
            names: path.display().to_string(),
        })
    }

    /// Validate that an installation is usable: the executable exists and
    /// is not empty.
    pub fn validate(installation: &HostInstallation) -> Result<(), DiscoveryError> {
        let missing = || DiscoveryError::ExecutableMissing {
            install_dir: installation.install_dir.clone(),
            names: installation.executable.display().to_string(),
        };

        let metadata = std::fs::metadata(&installation.executable).map_err(|_| missing())?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(missing());
        }
        Ok(())
    }

    /// First configured executable name present in `dir`.
    fn find_executable_in(&self, dir: &Path) -> Option<PathBuf> {
        self.names
            .iter()
            .map(|name| dir.join(Self::executable_file_name(name)))
            .find(|candidate| candidate.is_file())
    }

    /// Append the platform executable suffix when missing.
    fn executable_file_name(name: &str) -> String {
        let suffix = std::env::consts::EXE_SUFFIX;
        if suffix.is_empty() || name.ends_with(suffix) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> HostDiscovery {
        HostDiscovery::new(vec!["SketchUp".to_string()])
    }

    fn exe(dir: &Path) -> PathBuf {
        let path = dir.join(HostDiscovery::executable_file_name("SketchUp"));
        std::fs::write(&path, b"#!/bin/sh\n").expect("write");
        path
    }

    #[test]
    fn test_explicit_path_nonexistent() {
        let result = discovery().from_explicit_path(Path::new("/nonexistent/host"));
        assert!(matches!(result, Err(DiscoveryError::NotFound { .. })));
    }

    #[test]
    fn test_explicit_path_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = exe(temp.path());

        let installation = discovery().from_explicit_path(&path).expect("ok");
        assert_eq!(installation.executable, path);
        assert_eq!(installation.install_dir, temp.path());
        assert_eq!(installation.discovery_method, DiscoveryMethod::ExplicitConfig);
    }

    #[test]
    fn test_explicit_directory_without_executable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let result = discovery().from_explicit_path(temp.path());
        assert!(matches!(result, Err(DiscoveryError::ExecutableMissing { .. })));
    }

    #[test]
    fn test_versioned_root_prefers_newest() {
        let temp = tempfile::tempdir().expect("tempdir");
        for version in ["2022", "2024", "2023"] {
            let dir = temp.path().join(format!("SketchUp {version}"));
            std::fs::create_dir_all(&dir).expect("mkdir");
            exe(&dir);
        }
        std::fs::create_dir_all(temp.path().join("Other 2030")).expect("mkdir");

        let installation = discovery()
            .find_in_versioned_root(temp.path())
            .expect("found");
        assert_eq!(installation.version.as_deref(), Some("2024"));
        assert_eq!(installation.discovery_method, DiscoveryMethod::CommonPath);
    }

    #[test]
    fn test_versioned_root_skips_empty_versions() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(temp.path().join("SketchUp 2025")).expect("mkdir");
        let older = temp.path().join("SketchUp 2021");
        std::fs::create_dir_all(&older).expect("mkdir");
        exe(&older);

        let installation = discovery()
            .find_in_versioned_root(temp.path())
            .expect("found");
        assert_eq!(installation.version.as_deref(), Some("2021"));
    }

    #[test]
    fn test_find_on_path() {
        let empty = tempfile::tempdir().expect("tempdir");
        let bin = tempfile::tempdir().expect("tempdir");
        let path = exe(bin.path());

        let path_var = std::env::join_paths([empty.path(), bin.path()]).expect("join");
        let installation = discovery().find_on_path(&path_var).expect("found");
        assert_eq!(installation.executable, path);
        assert_eq!(installation.discovery_method, DiscoveryMethod::SystemPath);
    }

    #[test]
    fn test_find_on_path_missing() {
        let empty = tempfile::tempdir().expect("tempdir");
        let path_var = std::env::join_paths([empty.path()]).expect("join");
        assert!(discovery().find_on_path(&path_var).is_none());
    }

    #[test]
    fn test_resolve_explicit_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = exe(temp.path());
        let config = HostConfig {
            executable: path.clone(),
            ..Default::default()
        };
        let installation = HostDiscovery::resolve(&config).expect("resolve");
        assert_eq!(installation.executable, path);
    }

    #[test]
    fn test_validate_empty_executable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("SketchUp");
        std::fs::write(&path, b"").expect("write");
        let installation =
            HostInstallation::new(path, None, DiscoveryMethod::ExplicitConfig);
        assert!(HostDiscovery::validate(&installation).is_err());
    }

    #[test]
    fn test_installation_serialization() {
        let installation = HostInstallation::new(
            PathBuf::from("C:/Program Files/SketchUp/SketchUp 2024/SketchUp.exe"),
            Some("2024".to_string()),
            DiscoveryMethod::WindowsRegistry,
        );
        let json = serde_json::to_string(&installation).expect("serialize");
        assert!(json.contains("windows_registry"));
        assert!(installation.summary().contains("v2024"));
    }
}
