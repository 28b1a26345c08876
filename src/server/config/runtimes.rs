use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_NODE_COMMAND: &str = "node";
pub const DEFAULT_NPM_COMMAND: &str = if cfg!(windows) { "npm.cmd" } else { "npm" };
pub const DEFAULT_NPX_COMMAND: &str = if cfg!(windows) { "npx.cmd" } else { "npx" };
pub const DEFAULT_UVX_COMMAND: &str = "uvx";
pub const DEFAULT_NODE_INSTALL_URL: &str = "https://nodejs.org/en/download";
pub const DEFAULT_UV_INSTALL_URL: &str = "https://docs.astral.sh/uv/getting-started/installation/";

/// External commands the installer shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimesConfig {
    /// General-purpose runtime; probed before registry installs and used to launch local packages.
    pub node: String,
    /// Registry client used for lookups and local `install`.
    pub npm: String,
    /// Registry-backed runner written into host configs.
    pub npx: String,
    /// Alternate runner for packages outside the npm registry.
    pub uvx: String,
    pub node_install_url: String,
    pub uv_install_url: String,
}

impl Default for RuntimesConfig {
    fn default() -> Self {
        Self {
            node: DEFAULT_NODE_COMMAND.into(),
            npm: DEFAULT_NPM_COMMAND.into(),
            npx: DEFAULT_NPX_COMMAND.into(),
            uvx: DEFAULT_UVX_COMMAND.into(),
            node_install_url: DEFAULT_NODE_INSTALL_URL.into(),
            uv_install_url: DEFAULT_UV_INSTALL_URL.into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawRuntimesSection {
    pub node: Option<String>,
    pub npm: Option<String>,
    pub npx: Option<String>,
    pub uvx: Option<String>,
    pub node_install_url: Option<String>,
    pub uv_install_url: Option<String>,
}

pub fn parse_runtimes_section(
    raw: Option<RawRuntimesSection>,
    path: &Path,
) -> Result<RuntimesConfig, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = RuntimesConfig::default();

    let config = RuntimesConfig {
        node: command_or_default(raw.node, defaults.node, "runtimes.node", path)?,
        npm: command_or_default(raw.npm, defaults.npm, "runtimes.npm", path)?,
        npx: command_or_default(raw.npx, defaults.npx, "runtimes.npx", path)?,
        uvx: command_or_default(raw.uvx, defaults.uvx, "runtimes.uvx", path)?,
        node_install_url: raw.node_install_url.unwrap_or(defaults.node_install_url),
        uv_install_url: raw.uv_install_url.unwrap_or(defaults.uv_install_url),
    };
    validate_url(&config.node_install_url, "runtimes.node_install_url", path)?;
    validate_url(&config.uv_install_url, "runtimes.uv_install_url", path)?;
    Ok(config)
}

fn command_or_default(
    value: Option<String>,
    default: String,
    field: &'static str,
    path: &Path,
) -> Result<String, ConfigError> {
    match value {
        None => Ok(default),
        Some(command) if command.trim().is_empty() => Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Command names cannot be empty".into(),
        }),
        Some(command) => Ok(command.trim().to_string()),
    }
}

fn validate_url(url: &str, field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        return Ok(());
    }
    Err(ConfigError::InvalidField {
        path: path.to_path_buf(),
        field,
        message: format!("Provide an http(s) URL: {url}"),
    })
}
