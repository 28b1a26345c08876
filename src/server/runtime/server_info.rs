use crate::{cli::LaunchProfile, lib::hosts::HostIdentity, server::config::InstallerConfig};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(profile: &LaunchProfile, config: &InstallerConfig) -> String {
    let hosts = HostIdentity::ALL
        .iter()
        .map(|host| host.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let source = if config.loaded_from_file {
        format!("Loaded config {}", config.source_path.display())
    } else {
        "Using built-in defaults".to_string()
    };
    format!(
        "{source}; serving in {transport} mode. Installs MCP servers into host configs (hosts: {hosts}; default for local installs: {default_host}). Use install_repo_mcp_server for npm/PyPI packages and install_local_mcp_server for a local Node.js package directory. Restart the host application after installing.",
        transport = profile.transport.as_str(),
        default_host = config.hosts.default_host.as_str(),
    )
}
