//! LaunchProfile and config path resolution.
use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::server::config::{CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

/// MCP transport mode.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Tcp,
}

impl TransportMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Tcp => "tcp",
        }
    }
}

/// Resolved launch profile.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub config_path: PathBuf,
    /// True when the path came from `--config` or `MCP_INSTALLER_CONFIG`; the file must then exist.
    pub config_explicit: bool,
    pub transport: TransportMode,
    pub launch_args: Vec<String>,
}

/// Resolve config path in the order: CLI override → env var → default.
///
/// Returns the absolute path and whether it was named explicitly.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<(PathBuf, bool)> {
    let env_path = env::var_os(CONFIG_ENV_KEY)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let (path, explicit) = match override_path.or(env_path) {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if path.is_absolute() {
        return Ok((path, explicit));
    }

    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok((cwd.join(path), explicit))
}

/// Build launch arguments suitable for reproduction/logging.
pub fn build_launch_args(transport: TransportMode, config: &Path) -> Vec<String> {
    vec![
        format!("--transport={}", transport.as_str()),
        format!("--config={}", config.display()),
    ]
}
