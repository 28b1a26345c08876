use tracing::{debug, info};

use super::InstallerConfig;

pub fn log_defaults(path: &std::path::Path) {
    debug!(
        target: "mcp_installer::config",
        path = %path.display(),
        "Configuration file not found; using built-in defaults"
    );
}

pub fn log_loaded(config: &InstallerConfig) {
    info!(
        target: "mcp_installer::config",
        path = %config.source_path.display(),
        host = %config.server.host,
        port = config.server.port,
        node = %config.runtimes.node,
        npx = %config.runtimes.npx,
        uvx = %config.runtimes.uvx,
        home_override = config.hosts.home_dir.is_some(),
        default_host = config.hosts.default_host.as_str(),
        "Configuration file loaded successfully"
    );
}
