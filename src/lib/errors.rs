use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use rmcp::model::ErrorData;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::lib::hosts::HostIdentity;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failure of an external command started by the installer.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited abnormally (exit={exit_code:?}): {output}")]
    Exited {
        program: String,
        exit_code: Option<i32>,
        output: String,
    },
}

/// Every way an install request can fail.
///
/// The `Display` text is what the caller sees, so each message names the
/// path or command that was checked.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{host} is not installed: config directory {path} does not exist")]
    HostNotInstalled { host: HostIdentity, path: PathBuf },
    #[error("{host} config file not found at {path}; start {host} once so it creates the file")]
    ConfigFileNotFound { host: HostIdentity, path: PathBuf },
    #[error("Failed to parse {host} config {path} as JSON: {source}")]
    ConfigParse {
        host: HostIdentity,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{host} config {path} is not usable: {message}")]
    InvalidHostConfig {
        host: HostIdentity,
        path: PathBuf,
        message: String,
    },
    #[error("Failed to read {host} config {path}: {source}")]
    ConfigRead {
        host: HostIdentity,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {host} config {path}: {source}")]
    ConfigWrite {
        host: HostIdentity,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{runtime} is not installed (`{command}` could not be run); please install it from {install_url}")]
    RuntimeMissing {
        runtime: &'static str,
        command: String,
        install_url: String,
    },
    #[error("Could not determine the home directory; set hosts.home_dir in the installer config")]
    HomeDirUnavailable,
    #[error("Path {path} does not exist")]
    LocalPathNotFound { path: PathBuf },
    #[error("No package.json found in {path}; only Node.js packages can be installed from a local path")]
    NoManifest { path: PathBuf },
    #[error("Failed to parse package manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Installation failed in {path}: {source}")]
    InstallFailed {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
    #[error("No executable servers found in {path}: package.json declares neither `bin` nor `main`")]
    NoExecutablesFound { path: PathBuf },
}

/// Structured error metadata returned by MCP tools.
#[derive(Debug, Clone, Serialize)]
pub struct ToolErrorDescriptor {
    /// Error code.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
}

impl ToolErrorDescriptor {
    /// Simple constructor.
    pub const fn new(code: &'static str, message: &'static str, remediation: &'static str) -> Self {
        Self {
            code,
            message,
            remediation,
        }
    }

    /// Create a builder.
    pub fn builder(&self) -> ToolErrorDescriptorBuilder<'_> {
        ToolErrorDescriptorBuilder::new(self)
    }
}

/// Builder for error data that fails if required fields are missing.
pub struct ToolErrorDescriptorBuilder<'a> {
    descriptor: &'a ToolErrorDescriptor,
    retryable: Option<bool>,
    details: Option<Value>,
    extra_fields: Map<String, Value>,
}

impl<'a> ToolErrorDescriptorBuilder<'a> {
    pub fn new(descriptor: &'a ToolErrorDescriptor) -> Self {
        Self {
            descriptor,
            retryable: None,
            details: None,
            extra_fields: Map::new(),
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_exit_code_value(mut self, exit_code: u8) -> Self {
        let numeric = Number::from(exit_code);
        self.extra_fields
            .insert("exit_code".into(), Value::Number(numeric));
        self
    }

    pub fn build(self) -> Result<ErrorData, ToolErrorBuilderError> {
        if self.descriptor.remediation.trim().is_empty() {
            return Err(ToolErrorBuilderError::MissingRemediation {
                code: self.descriptor.code,
            });
        }
        let retryable = self
            .retryable
            .ok_or(ToolErrorBuilderError::MissingRetryable {
                code: self.descriptor.code,
            })?;

        let mut data = Map::new();
        data.insert("code".into(), Value::String(self.descriptor.code.into()));
        data.insert(
            "remediation".into(),
            Value::String(self.descriptor.remediation.into()),
        );
        data.insert("retryable".into(), Value::Bool(retryable));
        if let Some(details) = self.details {
            data.insert("details".into(), details);
        }
        for (key, value) in self.extra_fields {
            data.insert(key, value);
        }

        Ok(ErrorData::invalid_params(
            self.descriptor.message,
            Some(Value::Object(data)),
        ))
    }
}

/// Errors when required builder fields are missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolErrorBuilderError {
    #[error("retryable is missing (code={code})")]
    MissingRetryable { code: &'static str },
    #[error("remediation is empty (code={code})")]
    MissingRemediation { code: &'static str },
}

/// Standard error when executed without an MCP client.
pub const MCP_CLIENT_REQUIRED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "MCP_CLIENT_REQUIRED",
    "The MCP server can only be executed via an MCP client",
    "Launch through an MCP client such as `npx @modelcontextprotocol/inspector target/release/mcp-installer`, or use a CLI subcommand (`mcp-installer --help`).",
);
