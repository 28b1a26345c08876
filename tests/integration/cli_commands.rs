use std::process::{Command as StdCommand, Output, Stdio};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

use crate::common::{seed_cursor_config, write_home_config, BINARY_PATH};

fn run_cli(config: &std::path::Path, args: &[&str]) -> Result<Output> {
    StdCommand::new(BINARY_PATH)
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("MCP_INSTALLER_CONFIG")
        .stdin(Stdio::null())
        .output()
        .context("failed to run mcp-installer")
}

fn stdout_json(output: &Output) -> Result<Value> {
    serde_json::from_slice(&output.stdout).with_context(|| {
        format!(
            "stdout is not JSON: {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn locate_prints_config_location() -> Result<()> {
    let home = tempdir()?;
    seed_cursor_config(home.path(), "{}")?;
    let config = write_home_config(home.path(), home.path())?;

    let output = run_cli(&config, &["locate", "--host", "cursor"])?;

    assert!(output.status.success(), "{output:?}");
    let payload = stdout_json(&output)?;
    assert_eq!(payload["host"], "cursor");
    assert_eq!(payload["installed"], Value::Bool(true));
    assert_eq!(payload["config_exists"], Value::Bool(true));
    assert_eq!(
        payload["config_file"],
        home.path().join(".cursor/mcp.json").to_string_lossy().as_ref()
    );
    Ok(())
}

#[test]
fn install_for_missing_host_exits_non_zero() -> Result<()> {
    let home = tempdir()?;
    let config = write_home_config(home.path(), home.path())?;

    let output = run_cli(&config, &["install", "some-server", "--host", "vscode"])?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let payload = stdout_json(&output)?;
    assert_eq!(payload["status"], "failed");
    assert_eq!(payload["failed_stage"], "validate_host");
    Ok(())
}

#[test]
fn relative_local_path_is_rejected() -> Result<()> {
    let home = tempdir()?;
    let config = write_home_config(home.path(), home.path())?;

    let output = run_cli(&config, &["install-local", "not/absolute"])?;

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(output.stdout.is_empty(), "nothing is printed on validation errors");
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("must be absolute"),
        "{output:?}"
    );
    Ok(())
}
