//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};
use crate::lib::hosts::HostIdentity;

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    Cli(CliCommand, LaunchProfile),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Register a published npm or PyPI package with a host application.
    Install(InstallArgs),
    /// Run `npm install` in a local package directory and register its entry point.
    #[command(name = "install-local")]
    InstallLocal(InstallLocalArgs),
    /// Print where a host application keeps its MCP config.
    Locate(LocateArgs),
}

/// Arguments shared by both install commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerEntryArgs {
    /// Extra argument passed to the server (repeatable).
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,
    /// Environment variable as KEY=VALUE (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,
}

/// Arguments for `install`.
#[derive(Debug, Clone, Args)]
#[command(
    after_help = "Hint: npm packages launch through npx; anything not on npm is assumed to be a PyPI package launched through uvx."
)]
pub struct InstallArgs {
    /// Package name, e.g. `@modelcontextprotocol/server-filesystem`.
    pub name: String,
    /// Host application to register the server with.
    #[arg(long, value_enum)]
    pub host: HostIdentity,
    #[command(flatten)]
    pub entry: ServerEntryArgs,
}

/// Arguments for `install-local`.
#[derive(Debug, Clone, Args)]
pub struct InstallLocalArgs {
    /// Absolute path to a directory containing `package.json`.
    pub path: PathBuf,
    /// Host application (defaults to `hosts.default_host` from config).
    #[arg(long, value_enum)]
    pub host: Option<HostIdentity>,
    #[command(flatten)]
    pub entry: ServerEntryArgs,
}

/// Arguments for `locate`.
#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    #[arg(long, value_enum)]
    pub host: HostIdentity,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcp-installer",
    author,
    version,
    about = "MCP server that installs other MCP servers into Claude Desktop, Cursor and VS Code",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Select stdio (default) or tcp.
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,
    /// Path to mcp-installer.toml (overrides MCP_INSTALLER_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(&self) -> Result<LaunchProfile> {
        let (config_path, config_explicit) = resolve_config_path(self.config_override.clone())?;
        let launch_args = build_launch_args(self.transport, &config_path);

        Ok(LaunchProfile {
            config_path,
            config_explicit,
            transport: self.transport,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        let profile = self.build()?;
        Ok(match self.command {
            Some(command) => ParsedCommand::Cli(command, profile),
            None => ParsedCommand::RunServer(profile),
        })
    }
}
