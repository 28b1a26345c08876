//! TTY check performed before serving over stdio.
use std::{io::IsTerminal, process::ExitCode};

use serde_json::json;

use super::runtime::RuntimeExit;
use crate::{cli::LaunchProfile, lib::errors::MCP_CLIENT_REQUIRED_ERROR};

const MCP_CLIENT_REQUIRED_EXIT: u8 = 44;

/// Refuse to serve when a human is attached to stdin/stdout.
pub fn ensure_invoked_via_mcp_client(profile: &LaunchProfile) -> Result<(), RuntimeExit> {
    let stdin_tty = std::io::stdin().is_terminal();
    let stdout_tty = std::io::stdout().is_terminal();
    check_stdio(profile, stdin_tty, stdout_tty)
}

fn check_stdio(profile: &LaunchProfile, stdin_tty: bool, stdout_tty: bool) -> Result<(), RuntimeExit> {
    if !stdin_tty && !stdout_tty {
        return Ok(());
    }
    let data = MCP_CLIENT_REQUIRED_ERROR
        .builder()
        .retryable(true)
        .details(json!({
            "transport": profile.transport.as_str(),
            "stdin_is_tty": stdin_tty,
            "stdout_is_tty": stdout_tty
        }))
        .with_exit_code_value(MCP_CLIENT_REQUIRED_EXIT)
        .build()
        .map_err(RuntimeExit::from_error)?;
    Err(RuntimeExit::structured(
        data,
        ExitCode::from(MCP_CLIENT_REQUIRED_EXIT),
    ))
}
