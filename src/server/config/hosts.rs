use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, hosts::HostIdentity, paths::is_nonempty_absolute};

/// Host discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsConfig {
    /// Replaces the current user's home directory when locating host configs.
    pub home_dir: Option<PathBuf>,
    /// Replaces the roaming application-data root (Windows).
    pub app_data_dir: Option<PathBuf>,
    /// Host targeted by local installs that do not name one.
    pub default_host: HostIdentity,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            home_dir: None,
            app_data_dir: None,
            default_host: HostIdentity::Claude,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawHostsSection {
    pub home_dir: Option<PathBuf>,
    pub app_data_dir: Option<PathBuf>,
    pub default_host: Option<HostIdentity>,
}

pub fn parse_hosts_section(
    raw: Option<RawHostsSection>,
    path: &Path,
) -> Result<HostsConfig, ConfigError> {
    let raw = raw.unwrap_or_default();
    validate_root(raw.home_dir.as_deref(), "hosts.home_dir", path)?;
    validate_root(raw.app_data_dir.as_deref(), "hosts.app_data_dir", path)?;

    Ok(HostsConfig {
        home_dir: raw.home_dir,
        app_data_dir: raw.app_data_dir,
        default_host: raw.default_host.unwrap_or(HostIdentity::Claude),
    })
}

fn validate_root(root: Option<&Path>, field: &'static str, path: &Path) -> Result<(), ConfigError> {
    match root {
        Some(dir) if !is_nonempty_absolute(dir) => Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: format!("Only absolute paths are allowed: {}", dir.display()),
        }),
        _ => Ok(()),
    }
}
