use std::{
    path::Path,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::lib::errors::CommandError;

/// Number of trailing characters of command output kept in failure messages.
const OUTPUT_EXCERPT_LIMIT: usize = 2_000;

/// Abstraction for starting external runtimes during an install.
pub trait CommandRunner: Send + Sync {
    /// Run `program args` and report whether it exited successfully.
    ///
    /// Spawn failures and non-zero exits both collapse to `false`.
    fn probe(&self, program: &str, args: &[&str]) -> bool;

    /// Run `program args` with `dir` as the working directory, blocking until it exits.
    fn run_in(&self, program: &str, args: &[&str], dir: &Path) -> Result<(), CommandError>;
}

/// Runner that starts real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn probe(&self, program: &str, args: &[&str]) -> bool {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) => {
                debug!(
                    target: "mcp_installer::install",
                    program,
                    ?args,
                    exit_code = status.code(),
                    "Probe finished"
                );
                status.success()
            }
            Err(err) => {
                debug!(
                    target: "mcp_installer::install",
                    program,
                    ?args,
                    error = %err,
                    "Probe could not start"
                );
                false
            }
        }
    }

    fn run_in(&self, program: &str, args: &[&str], dir: &Path) -> Result<(), CommandError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(CommandError::Exited {
            program: program.to_string(),
            exit_code: output.status.code(),
            output: output_excerpt(&output.stdout, &output.stderr, OUTPUT_EXCERPT_LIMIT),
        })
    }
}

/// Merge stdout/stderr and take at most `limit` characters from the end.
pub fn output_excerpt(stdout: &[u8], stderr: &[u8], limit: usize) -> String {
    let mut combined = Vec::with_capacity(stdout.len() + stderr.len());
    combined.extend_from_slice(stdout);
    combined.extend_from_slice(stderr);
    let text = String::from_utf8_lossy(&combined);
    let text = text.trim();
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}
