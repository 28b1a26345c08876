use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use mcp_installer::server::{config::InstallerConfig, runtime::InstallerServer};
use rmcp::{
    model::{CallToolRequestParam, CallToolResult, ClientInfo},
    serve_client,
    service::ServiceError,
    ServiceExt,
};
use serde_json::{json, Value};
use tempfile::tempdir;

use crate::common::{seed_cursor_config, FakeRunner};

fn config_for(home: &Path) -> InstallerConfig {
    let mut config = InstallerConfig::default();
    config.hosts.home_dir = Some(home.to_path_buf());
    config.hosts.app_data_dir = Some(home.join("AppData"));
    config.runtimes.npm = "npm".into();
    config.runtimes.npx = "npx".into();
    config
}

async fn call(
    config: InstallerConfig,
    runner: FakeRunner,
    tool: &'static str,
    arguments: Value,
) -> Result<Result<CallToolResult, ServiceError>> {
    let server = InstallerServer::with_runner(config, "install-integration".into(), Arc::new(runner));
    let (server_transport, client_transport) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        Result::<_, anyhow::Error>::Ok(())
    });
    let client = serve_client(ClientInfo::default(), client_transport).await?;

    let arguments = arguments.as_object().context("arguments must be an object")?.clone();
    let result = client
        .call_tool(CallToolRequestParam {
            name: tool.into(),
            arguments: Some(arguments),
        })
        .await;
    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(result)
}

fn outcome(result: CallToolResult) -> Value {
    result.structured_content.expect("structured_content")
}

#[tokio::test]
async fn repo_install_writes_entry_and_keeps_other_keys() -> Result<()> {
    let home = tempdir()?;
    let file = seed_cursor_config(
        home.path(),
        r#"{"theme": "dark", "mcpServers": {"existing": {"command": "node", "args": ["a.js"]}}}"#,
    )?;

    let result = call(
        config_for(home.path()),
        FakeRunner::new(&["node"], &["@modelcontextprotocol/server-filesystem"]),
        "install_repo_mcp_server",
        json!({
            "name": "@modelcontextprotocol/server-filesystem",
            "host": "cursor",
            "args": ["/srv/shared"]
        }),
    )
    .await?
    .expect("tool call should succeed");

    let payload = outcome(result);
    assert_eq!(payload["succeeded"], Value::Bool(true), "{payload}");

    let written: Value = serde_json::from_str(&fs::read_to_string(&file)?)?;
    assert_eq!(written["theme"], "dark");
    assert_eq!(written["mcpServers"]["existing"]["command"], "node");
    assert_eq!(
        written["mcpServers"]["server-filesystem"],
        json!({
            "command": "npx",
            "args": ["@modelcontextprotocol/server-filesystem", "/srv/shared"]
        })
    );
    Ok(())
}

#[tokio::test]
async fn missing_host_is_a_failed_outcome_not_an_error() -> Result<()> {
    let home = tempdir()?;

    let result = call(
        config_for(home.path()),
        FakeRunner::new(&["node"], &["pkg"]),
        "install_repo_mcp_server",
        json!({ "name": "pkg", "host": "cursor" }),
    )
    .await?
    .expect("domain failures are reported as outcomes");

    let payload = outcome(result);
    assert_eq!(payload["succeeded"], Value::Bool(false));
    assert!(
        payload["message"]
            .as_str()
            .is_some_and(|message| message.contains("Cursor is not installed")),
        "{payload}"
    );
    Ok(())
}

#[tokio::test]
async fn blank_package_name_is_invalid_params() -> Result<()> {
    let home = tempdir()?;

    let error = call(
        config_for(home.path()),
        FakeRunner::new(&["node"], &[]),
        "install_repo_mcp_server",
        json!({ "name": "   ", "host": "claude" }),
    )
    .await?
    .expect_err("blank names are rejected before any work");

    match error {
        ServiceError::McpError(data) => {
            let data = serde_json::to_value(data)?;
            assert_eq!(data["data"]["code"], "invalid_request", "{data}");
        }
        other => anyhow::bail!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn option_like_package_name_is_invalid_params() -> Result<()> {
    let home = tempdir()?;
    let file = seed_cursor_config(home.path(), "{}")?;

    let error = call(
        config_for(home.path()),
        FakeRunner::new(&["node"], &["--registry=http://evil.example"]),
        "install_repo_mcp_server",
        json!({ "name": "--registry=http://evil.example", "host": "cursor" }),
    )
    .await?
    .expect_err("names starting with a dash are rejected before any work");

    match error {
        ServiceError::McpError(data) => {
            let data = serde_json::to_value(data)?;
            assert_eq!(data["data"]["code"], "invalid_request", "{data}");
            assert_eq!(data["data"]["details"]["field"], "name", "{data}");
        }
        other => anyhow::bail!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read_to_string(&file)?, "{}");
    Ok(())
}

#[tokio::test]
async fn local_install_registers_first_binary_with_node() -> Result<()> {
    let home = tempdir()?;
    let file = seed_cursor_config(home.path(), "{}")?;
    let package = tempdir()?;
    fs::write(
        package.path().join("package.json"),
        r#"{"name": "@acme/notes", "bin": {"notes-mcp": "dist/cli.js", "notes-admin": "dist/admin.js"}}"#,
    )?;

    let result = call(
        config_for(home.path()),
        FakeRunner::new(&["node"], &[]),
        "install_local_mcp_server",
        json!({
            "path": package.path().to_string_lossy(),
            "host": "cursor",
            "env": ["NOTES_DIR=/tmp/notes"]
        }),
    )
    .await?
    .expect("tool call should succeed");

    assert_eq!(outcome(result)["succeeded"], Value::Bool(true));

    let written: Value = serde_json::from_str(&fs::read_to_string(&file)?)?;
    let entry = &written["mcpServers"]["notes-mcp"];
    assert_eq!(entry["command"], "node");
    assert_eq!(
        entry["args"][0],
        package.path().join("dist/cli.js").to_string_lossy().as_ref()
    );
    assert_eq!(entry["env"]["NOTES_DIR"], "/tmp/notes");
    assert!(written["mcpServers"].get("notes-admin").is_none());
    Ok(())
}
