//! Telemetry initialization and install request span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of one install request.
pub struct InstallSpan {
    span: Span,
    started_at: Instant,
    request_id: Uuid,
}

impl InstallSpan {
    /// Start a request span.
    pub fn start(operation: &'static str) -> Self {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            target: "mcp_installer::install",
            "install_request",
            %request_id,
            operation
        );
        Self {
            span,
            started_at: Instant::now(),
            request_id,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span while recording status and completion info.
    pub fn finish(self, succeeded: bool, failed_stage: Option<&'static str>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        if succeeded {
            info!(
                target: "mcp_installer::install",
                request_id = %self.request_id,
                elapsed_ms = elapsed_ms,
                "Completed install request"
            );
        } else {
            warn!(
                target: "mcp_installer::install",
                request_id = %self.request_id,
                failed_stage = failed_stage.unwrap_or("unknown"),
                elapsed_ms = elapsed_ms,
                "Install request failed"
            );
        }
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub config_path: &'a str,
    pub instructions: &'a str,
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "mcp_installer::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        config_path = telemetry.config_path,
        instructions = telemetry.instructions,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
