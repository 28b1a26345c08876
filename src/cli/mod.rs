//! CLI entrypoint module structure.
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::{
    lib::hosts::HostIdentity,
    server::config::InstallerConfig,
    tools::installer::{
        CommandRunner, InstallLocalRequest, InstallRepoRequest, InstallReport, Installer,
        SystemCommandRunner,
    },
};

pub mod args;
pub mod profile;

pub use args::{
    CliCommand, InstallArgs, InstallLocalArgs, LaunchProfileArgs, LocateArgs, ParsedCommand,
    ServerEntryArgs,
};
pub use profile::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};

/// Rendered result of a CLI command.
#[derive(Debug, Clone)]
pub struct CliReport {
    /// Pretty-printed JSON written to stdout.
    pub payload: String,
    /// False when an install ran but did not register anything.
    pub succeeded: bool,
}

/// Execute CLI command mode against the real machine.
pub fn execute_cli_command(command: CliCommand, config: &InstallerConfig) -> Result<CliReport> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    execute_with_installer(command, &Installer::new(config, runner))
}

/// Execute CLI command mode with a prepared installer.
pub fn execute_with_installer(command: CliCommand, installer: &Installer) -> Result<CliReport> {
    match command {
        CliCommand::Install(args) => {
            let request = InstallRepoRequest {
                name: args.name,
                host: args.host,
                args: args.entry.args,
                env: args.entry.env,
            };
            request.validate()?;
            let report = installer.install_from_registry(&request);
            render_install(request.host, &report)
        }
        CliCommand::InstallLocal(args) => {
            let request = InstallLocalRequest {
                path: args.path,
                host: args.host,
                args: args.entry.args,
                env: args.entry.env,
            };
            request.validate()?;
            let host = request.host.unwrap_or_else(|| installer.default_host());
            let report = installer.install_from_local_path(&request);
            render_install(host, &report)
        }
        CliCommand::Locate(args) => {
            let location = installer.locate(args.host)?;
            let payload = json!({
                "succeeded": true,
                "message": format!("{} keeps its MCP config at {}", args.host, location.file.display()),
                "host": args.host.as_str(),
                "display_name": args.host.display_name(),
                "config_dir": location.dir.to_string_lossy(),
                "config_file": location.file.to_string_lossy(),
                "installed": location.dir.is_dir(),
                "config_exists": location.file.is_file(),
            });
            Ok(CliReport {
                payload: to_pretty(&payload)?,
                succeeded: true,
            })
        }
    }
}

fn render_install(host: HostIdentity, report: &InstallReport) -> Result<CliReport> {
    let stages: Vec<&str> = report.run.completed().iter().map(|stage| stage.as_str()).collect();
    let mut payload = json!({
        "succeeded": report.outcome.succeeded,
        "status": if report.outcome.succeeded { "installed" } else { "failed" },
        "host": host.as_str(),
        "message": report.outcome.message,
        "completed_stages": stages,
        "failed_stage": report.run.failed().map(|stage| stage.as_str()),
    });
    if let Some(registered) = &report.registered {
        payload["server_name"] = Value::String(registered.name.clone());
        payload["config_path"] = Value::String(registered.config_path.to_string_lossy().into_owned());
        payload["entry"] = serde_json::to_value(&registered.entry)
            .context("failed to serialize server entry")?;
    }
    Ok(CliReport {
        payload: to_pretty(&payload)?,
        succeeded: report.outcome.succeeded,
    })
}

fn to_pretty(payload: &Value) -> Result<String> {
    serde_json::to_string_pretty(payload).context("failed to render CLI payload")
}
