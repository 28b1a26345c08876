//! Choosing how a published package is launched.

use tracing::{debug, info};

use crate::{lib::errors::InstallError, server::config::RuntimesConfig};

use super::probe::CommandRunner;

/// Result of looking a package up in the npm registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageLookup {
    Found,
    NotFound,
}

/// Runner written into the host config for a published package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Fetch and run from the npm registry (`npx`).
    RegistryRunner,
    /// Fetch and run from PyPI (`uvx`).
    AlternateRunner,
}

impl LaunchStrategy {
    pub fn command<'a>(&self, runtimes: &'a RuntimesConfig) -> &'a str {
        match self {
            LaunchStrategy::RegistryRunner => &runtimes.npx,
            LaunchStrategy::AlternateRunner => &runtimes.uvx,
        }
    }
}

/// Server name registered for a package: the part after `@scope/` for scoped names.
pub fn server_name_for(package: &str) -> &str {
    if !package.starts_with('@') {
        return package;
    }
    match package.rfind('/') {
        Some(index) if index + 1 < package.len() => &package[index + 1..],
        _ => package,
    }
}

/// Whether the general-purpose runtime can be invoked.
pub fn ensure_node(runner: &dyn CommandRunner, runtimes: &RuntimesConfig) -> Result<(), InstallError> {
    if runner.probe(&runtimes.node, &["--version"]) {
        return Ok(());
    }
    Err(InstallError::RuntimeMissing {
        runtime: "Node.js",
        command: format!("{} --version", runtimes.node),
        install_url: runtimes.node_install_url.clone(),
    })
}

pub fn lookup_package(
    runner: &dyn CommandRunner,
    runtimes: &RuntimesConfig,
    package: &str,
) -> PackageLookup {
    if runner.probe(&runtimes.npm, &["view", package, "name"]) {
        PackageLookup::Found
    } else {
        PackageLookup::NotFound
    }
}

/// Pick the runner for `package`: node must exist, npm packages use `npx`, anything else needs `uvx`.
pub fn resolve_launch_strategy(
    runner: &dyn CommandRunner,
    runtimes: &RuntimesConfig,
    package: &str,
) -> Result<LaunchStrategy, InstallError> {
    ensure_node(runner, runtimes)?;

    match lookup_package(runner, runtimes, package) {
        PackageLookup::Found => {
            info!(
                target: "mcp_installer::install",
                package,
                runner = %runtimes.npx,
                "Package found in npm registry"
            );
            Ok(LaunchStrategy::RegistryRunner)
        }
        PackageLookup::NotFound => {
            debug!(
                target: "mcp_installer::install",
                package,
                "Package not found in npm registry; falling back to uvx"
            );
            if runner.probe(&runtimes.uvx, &["--version"]) {
                Ok(LaunchStrategy::AlternateRunner)
            } else {
                Err(InstallError::RuntimeMissing {
                    runtime: "Python uv",
                    command: format!("{} --version", runtimes.uvx),
                    install_url: runtimes.uv_install_url.clone(),
                })
            }
        }
    }
}
