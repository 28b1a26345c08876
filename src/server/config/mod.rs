//! Load and validate installer configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod hosts;
pub mod runtimes;
pub mod server;
pub mod telemetry;

pub use hosts::{parse_hosts_section, HostsConfig, RawHostsSection};
pub use runtimes::{
    parse_runtimes_section, RawRuntimesSection, RuntimesConfig, DEFAULT_NODE_COMMAND,
    DEFAULT_NPM_COMMAND, DEFAULT_NPX_COMMAND, DEFAULT_UVX_COMMAND, DEFAULT_UV_INSTALL_URL,
};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};

pub(crate) const CONFIG_ENV_KEY: &str = "MCP_INSTALLER_CONFIG";
pub(crate) const DEFAULT_CONFIG_PATH: &str = "mcp-installer.toml";

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    pub server: ServerSection,
    pub runtimes: RuntimesConfig,
    pub hosts: HostsConfig,
    pub source_path: PathBuf,
    /// False when `source_path` did not exist and built-in defaults were used.
    pub loaded_from_file: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            runtimes: RuntimesConfig::default(),
            hosts: HostsConfig::default(),
            source_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            loaded_from_file: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawInstallerConfig {
    server: Option<RawServerSection>,
    runtimes: Option<RawRuntimesSection>,
    hosts: Option<RawHostsSection>,
}

impl InstallerConfig {
    /// Load configuration, falling back to defaults when `path` does not exist.
    pub fn load_optional(path: PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load_from_path(path);
        }
        telemetry::log_defaults(&path);
        Ok(Self {
            source_path: path,
            ..Self::default()
        })
    }

    /// Load configuration from a specific path; the file must exist.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "mcp_installer::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "mcp_installer::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawInstallerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "mcp_installer::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "mcp_installer::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawInstallerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server, &path)?;
        let runtimes = parse_runtimes_section(raw.runtimes, &path)?;
        let hosts = parse_hosts_section(raw.hosts, &path)?;

        Ok(Self {
            server,
            runtimes,
            hosts,
            source_path: path,
            loaded_from_file: true,
        })
    }
}
