//! Host applications and the location of their MCP configuration files.
//!
//! Path computation is pure: it depends only on the host, the platform family,
//! and the home/app-data roots passed in. The single filesystem access is the
//! directory check in [`HostConfigLocation::ensure_installed`].

use std::{
    env, fmt,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lib::errors::InstallError;

/// Config file name used by Claude Desktop.
pub const CLAUDE_CONFIG_FILE: &str = "claude_desktop_config.json";
/// Config file name used by every other supported host.
pub const GENERIC_CONFIG_FILE: &str = "mcp.json";
/// Environment variable holding the roaming application-data root on Windows.
const APPDATA_ENV: &str = "APPDATA";

/// Host application that loads MCP servers from its own config file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HostIdentity {
    Claude,
    Cursor,
    Vscode,
}

impl HostIdentity {
    pub const ALL: [HostIdentity; 3] = [
        HostIdentity::Claude,
        HostIdentity::Cursor,
        HostIdentity::Vscode,
    ];

    /// Identifier used on the wire and in config files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HostIdentity::Claude => "claude",
            HostIdentity::Cursor => "cursor",
            HostIdentity::Vscode => "vscode",
        }
    }

    /// Human-readable application name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            HostIdentity::Claude => "Claude Desktop",
            HostIdentity::Cursor => "Cursor",
            HostIdentity::Vscode => "VS Code",
        }
    }

    pub const fn config_file_name(&self) -> &'static str {
        match self {
            HostIdentity::Claude => CLAUDE_CONFIG_FILE,
            HostIdentity::Cursor | HostIdentity::Vscode => GENERIC_CONFIG_FILE,
        }
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Operating system family that decides where host configs live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Unix,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Directories that host config paths are anchored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRoots {
    pub home: PathBuf,
    /// Roaming application-data root; only consulted on Windows.
    pub app_data: PathBuf,
}

impl HostRoots {
    /// Resolve roots from optional overrides, falling back to the current user's directories.
    pub fn resolve(
        home_override: Option<&Path>,
        app_data_override: Option<&Path>,
    ) -> Result<Self, InstallError> {
        let home = match home_override {
            Some(path) => path.to_path_buf(),
            None => dirs::home_dir().ok_or(InstallError::HomeDirUnavailable)?,
        };
        let app_data = app_data_override
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(APPDATA_ENV).map(PathBuf::from))
            .unwrap_or_else(|| home.join("AppData").join("Roaming"));
        Ok(Self { home, app_data })
    }
}

/// Where a host keeps its MCP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfigLocation {
    pub host: HostIdentity,
    pub dir: PathBuf,
    pub file: PathBuf,
}

impl HostConfigLocation {
    /// Compute the config directory and file for `host`.
    pub fn resolve(host: HostIdentity, platform: Platform, roots: &HostRoots) -> Self {
        let dir = match (host, platform) {
            (HostIdentity::Claude, Platform::Windows) => roots.app_data.join("Claude"),
            (HostIdentity::Claude, Platform::MacOs) => roots
                .home
                .join("Library")
                .join("Application Support")
                .join("Claude"),
            (HostIdentity::Claude, Platform::Unix) => roots.home.join(".config").join("Claude"),
            (other, Platform::Windows) => roots.app_data.join(format!(".{}", other.as_str())),
            (other, _) => roots.home.join(format!(".{}", other.as_str())),
        };
        let file = dir.join(host.config_file_name());
        Self { host, dir, file }
    }

    /// Fail unless the config directory exists and is a directory.
    pub fn ensure_installed(&self) -> Result<&Self, InstallError> {
        if self.dir.is_dir() {
            Ok(self)
        } else {
            Err(InstallError::HostNotInstalled {
                host: self.host,
                path: self.dir.clone(),
            })
        }
    }
}
