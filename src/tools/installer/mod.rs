//! MCP tools that register servers in host application configs.
//!
//! Both tools run the same pipeline: validate the host, resolve how the server
//! is launched, optionally build it, then merge one entry into the host config.

pub mod local;
pub mod merge;
pub mod pipeline;
pub mod probe;
pub mod registry;
pub mod request;

pub use local::{EntryPoint, LocalManifest, ManifestBin, MANIFEST_FILE};
pub use merge::{merge_server_entry, HostConfigDocument, ServerEntry, MCP_SERVERS_KEY};
pub use pipeline::{InstallOutcome, InstallReport, Installer, PipelineRun, RegisteredServer, Stage};
pub use probe::{CommandRunner, SystemCommandRunner};
pub use registry::{server_name_for, LaunchStrategy, PackageLookup};
pub use request::{
    parse_env_vars, validation_error_to_error_data, InstallLocalRequest, InstallRepoRequest,
    RequestValidationError,
};

pub const INSTALL_REPO_TOOL_ID: &str = "install_repo_mcp_server";
pub const INSTALL_LOCAL_TOOL_ID: &str = "install_local_mcp_server";
