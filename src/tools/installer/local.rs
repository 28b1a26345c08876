//! Building a local Node.js package and discovering its runnable entry points.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    lib::{errors::InstallError, paths::resolve_under},
    server::config::RuntimesConfig,
};

use super::{probe::CommandRunner, registry::server_name_for};

/// Manifest file that marks a directory as an installable package.
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of `package.json` used to find entry points.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bin: Option<ManifestBin>,
    #[serde(default)]
    pub main: Option<String>,
}

/// `bin` is either one path (named after the package) or a map of name to path.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManifestBin {
    Single(String),
    Named(Map<String, Value>),
}

/// A runnable script discovered in a local package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub path: PathBuf,
}

impl LocalManifest {
    pub fn read(dir: &Path) -> Result<Self, InstallError> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|_| InstallError::NoManifest {
            path: dir.to_path_buf(),
        })?;
        serde_json::from_str(&text).map_err(|source| InstallError::ManifestParse { path, source })
    }

    /// Name used for entries derived from the package itself.
    fn package_name(&self, dir: &Path) -> String {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| server_name_for(name).to_string())
            .or_else(|| {
                dir.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "server".to_string())
    }

    /// Entry points in declaration order, resolved to absolute paths under `dir`.
    ///
    /// Declared binaries win; `main` is used only when there are none.
    pub fn entry_points(&self, dir: &Path) -> Vec<EntryPoint> {
        let binaries = match &self.bin {
            Some(ManifestBin::Single(path)) if !path.trim().is_empty() => vec![EntryPoint {
                name: self.package_name(dir),
                path: resolve_under(dir, Path::new(path)),
            }],
            Some(ManifestBin::Named(entries)) => entries
                .iter()
                .filter_map(|(name, value)| {
                    let path = value.as_str().filter(|path| !path.trim().is_empty())?;
                    Some(EntryPoint {
                        name: name.clone(),
                        path: resolve_under(dir, Path::new(path)),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        if !binaries.is_empty() {
            return binaries;
        }

        match self.main.as_deref().filter(|main| !main.trim().is_empty()) {
            Some(main) => vec![EntryPoint {
                name: self.package_name(dir),
                path: resolve_under(dir, Path::new(main)),
            }],
            None => Vec::new(),
        }
    }
}

/// Check that `dir` exists and carries a manifest.
pub fn ensure_local_package(dir: &Path) -> Result<(), InstallError> {
    if !dir.exists() {
        return Err(InstallError::LocalPathNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.join(MANIFEST_FILE).is_file() {
        return Err(InstallError::NoManifest {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Run `npm install` in `dir`, then re-read the manifest and return its entry points.
pub fn install_local_package(
    runner: &dyn CommandRunner,
    runtimes: &RuntimesConfig,
    dir: &Path,
) -> Result<Vec<EntryPoint>, InstallError> {
    info!(
        target: "mcp_installer::install",
        path = %dir.display(),
        npm = %runtimes.npm,
        "Installing local package dependencies"
    );
    runner
        .run_in(&runtimes.npm, &["install"], dir)
        .map_err(|source| InstallError::InstallFailed {
            path: dir.to_path_buf(),
            source,
        })?;

    let manifest = LocalManifest::read(dir)?;
    Ok(manifest.entry_points(dir))
}

/// Only the first declared entry point is installed.
pub fn select_entry_point(
    dir: &Path,
    entry_points: Vec<EntryPoint>,
) -> Result<EntryPoint, InstallError> {
    let total = entry_points.len();
    let mut entries = entry_points.into_iter();
    let first = entries.next().ok_or_else(|| InstallError::NoExecutablesFound {
        path: dir.to_path_buf(),
    })?;
    if total > 1 {
        info!(
            target: "mcp_installer::install",
            selected = %first.name,
            skipped = ?entries.map(|entry| entry.name).collect::<Vec<_>>(),
            "Package declares several binaries; installing the first"
        );
    }
    Ok(first)
}
