//! Shared library modules providing error types, file utilities, host paths, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod hosts;
pub mod paths;
pub mod telemetry;
