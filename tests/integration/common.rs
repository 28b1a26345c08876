use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Mutex,
};

use anyhow::{Context, Result};
use mcp_installer::{lib::errors::CommandError, tools::installer::CommandRunner};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_mcp-installer");

pub async fn spawn_server_process() -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .env(
            "MCP_INSTALLER_CONFIG",
            fixture("tests/fixtures/config_valid.toml"),
        )
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().expect("child stdout");
    let stdin = child.stdin.take().expect("child stdin");
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

/// Write an installer config whose host roots point at `home`.
pub fn write_home_config(dir: &Path, home: &Path) -> Result<PathBuf> {
    let path = dir.join("mcp-installer.toml");
    let contents = format!(
        "[hosts]\nhome_dir = {home:?}\napp_data_dir = {app_data:?}\n",
        home = home.display().to_string(),
        app_data = home.join("AppData").display().to_string(),
    );
    fs::write(&path, contents)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(path)
}

/// Create `~/.cursor/mcp.json` under `home` with the given contents.
pub fn seed_cursor_config(home: &Path, contents: &str) -> Result<PathBuf> {
    let dir = home.join(".cursor");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let file = dir.join("mcp.json");
    fs::write(&file, contents).with_context(|| format!("failed to write {}", file.display()))?;
    Ok(file)
}

/// Command runner that never spawns processes.
#[derive(Debug, Default)]
pub struct FakeRunner {
    pub available: HashSet<String>,
    pub published: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(available: &[&str], published: &[&str]) -> Self {
        Self {
            available: available.iter().map(|s| s.to_string()).collect(),
            published: published.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn probe(&self, program: &str, args: &[&str]) -> bool {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{program} {}", args.join(" ")));
        match args {
            ["view", package, ..] => self.published.contains(*package),
            _ => self.available.contains(program),
        }
    }

    fn run_in(&self, program: &str, args: &[&str], _dir: &Path) -> Result<(), CommandError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{program} {}", args.join(" ")));
        Ok(())
    }
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
