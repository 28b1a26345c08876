//! MCP server configuration, startup guard, and runtime.

pub mod config;
pub mod guard;
pub mod runtime;
