use std::path::PathBuf;

use rmcp::model::ErrorData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::lib::{
    errors::{ToolErrorDescriptor, ToolErrorBuilderError},
    hosts::HostIdentity,
    paths::is_nonempty_absolute,
};

/// npm rejects package names longer than this.
const MAX_PACKAGE_NAME_LEN: usize = 214;
const MAX_PATH_LEN: usize = 4096;

const INVALID_REQUEST_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "invalid_request",
    "The install request format is invalid",
    "Check that `name` is a package name and `path` is an absolute directory path.",
);

/// Input for `install_repo_mcp_server`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallRepoRequest {
    /// Package name as published on npm or PyPI, e.g. `@modelcontextprotocol/server-filesystem`.
    pub name: String,
    /// Host application whose config receives the server entry.
    pub host: HostIdentity,
    /// Extra arguments appended after the package name.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables as `KEY=VALUE` strings.
    #[serde(default)]
    pub env: Vec<String>,
}

impl InstallRepoRequest {
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RequestValidationError::MissingName);
        }
        if name.len() > MAX_PACKAGE_NAME_LEN {
            return Err(RequestValidationError::NameTooLong { length: name.len() });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(RequestValidationError::NameContainsWhitespace {
                name: self.name.clone(),
            });
        }
        // Would reach npm and npx as an option rather than a package.
        if name.starts_with('-') {
            return Err(RequestValidationError::NameStartsWithDash {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Input for `install_local_mcp_server`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallLocalRequest {
    /// Absolute path to a directory containing a `package.json`.
    pub path: PathBuf,
    /// Host application; the configured default host when omitted.
    #[serde(default)]
    pub host: Option<HostIdentity>,
    /// Extra arguments appended after the entry point path.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables as `KEY=VALUE` strings.
    #[serde(default)]
    pub env: Vec<String>,
}

impl InstallLocalRequest {
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(RequestValidationError::MissingPath);
        }
        if !is_nonempty_absolute(&self.path) {
            return Err(RequestValidationError::PathNotAbsolute {
                path: self.path.clone(),
            });
        }
        if self.path.to_string_lossy().len() > MAX_PATH_LEN {
            return Err(RequestValidationError::PathTooLong);
        }
        Ok(())
    }
}

/// Parse `KEY=VALUE` strings, splitting on the first `=`.
///
/// Entries without a key are dropped; a missing `=` yields an empty value.
/// Keys keep their first position; a repeated key takes the last value.
pub fn parse_env_vars(entries: &[String]) -> Map<String, Value> {
    entries
        .iter()
        .filter_map(|entry| {
            let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), Value::String(value.to_string())))
            }
        })
        .collect()
}

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("name is required")]
    MissingName,
    #[error("name is too long ({length} characters, max {MAX_PACKAGE_NAME_LEN})")]
    NameTooLong { length: usize },
    #[error("name `{name}` must not contain whitespace")]
    NameContainsWhitespace { name: String },
    #[error("name `{name}` must not start with `-`")]
    NameStartsWithDash { name: String },
    #[error("path is required")]
    MissingPath,
    #[error("path `{path}` must be absolute")]
    PathNotAbsolute { path: PathBuf },
    #[error("path is too long (max {MAX_PATH_LEN} characters)")]
    PathTooLong,
}

pub fn validation_error_to_error_data(err: RequestValidationError) -> ErrorData {
    let details = match &err {
        RequestValidationError::PathNotAbsolute { path } => json!({
            "field": "path",
            "path": path.to_string_lossy(),
            "reason": err.to_string(),
        }),
        RequestValidationError::MissingPath | RequestValidationError::PathTooLong => {
            json!({ "field": "path", "reason": err.to_string() })
        }
        _ => json!({ "field": "name", "reason": err.to_string() }),
    };
    INVALID_REQUEST_ERROR
        .builder()
        .retryable(false)
        .details(details)
        .build()
        .unwrap_or_else(|builder_err: ToolErrorBuilderError| {
            ErrorData::internal_error(builder_err.to_string(), None)
        })
}
