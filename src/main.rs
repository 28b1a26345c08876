//! Entry point for the MCP installer.
use std::process::ExitCode;

use anyhow::Error;
use clap::Parser;
use mcp_installer::{
    cli::{execute_cli_command, CliCommand, LaunchProfile, LaunchProfileArgs, ParsedCommand},
    lib::telemetry,
    server::{
        config::InstallerConfig,
        runtime::{self, RuntimeExit},
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<ExitCode, RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = LaunchProfileArgs::parse();
    let command = args.into_command().map_err(RuntimeExit::from_error)?;

    match command {
        ParsedCommand::RunServer(profile) => {
            let config = load_config(&profile)?;
            runtime::run_server(profile, config).await?;
            Ok(ExitCode::SUCCESS)
        }
        ParsedCommand::Cli(command, profile) => {
            let config = load_config(&profile)?;
            handle_cli_command(command, config).await
        }
    }
}

fn load_config(profile: &LaunchProfile) -> Result<InstallerConfig, RuntimeExit> {
    let path = profile.config_path.clone();
    let loaded = if profile.config_explicit {
        InstallerConfig::load_from_path(path)
    } else {
        InstallerConfig::load_optional(path)
    };
    loaded.map_err(|err| RuntimeExit::from_error(Error::new(err)))
}

async fn handle_cli_command(
    command: CliCommand,
    config: InstallerConfig,
) -> Result<ExitCode, RuntimeExit> {
    let report = tokio::task::spawn_blocking(move || execute_cli_command(command, &config))
        .await
        .map_err(RuntimeExit::from_error)?
        .map_err(RuntimeExit::from_error)?;
    println!("{}", report.payload);
    Ok(if report.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
