use std::sync::Arc;

use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler},
    model::{ErrorData, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, Json,
};

use crate::{
    server::config::InstallerConfig,
    tools::{
        self,
        installer::{
            self, CommandRunner, InstallLocalRequest, InstallOutcome, InstallRepoRequest,
            Installer, SystemCommandRunner,
        },
        ServerToolRouter,
    },
};

#[derive(Clone)]
pub struct InstallerServer {
    config: Arc<InstallerConfig>,
    instructions: Arc<String>,
    tool_router: ServerToolRouter<Self>,
    installer: Arc<Installer>,
}

impl InstallerServer {
    pub fn new(config: InstallerConfig, instructions: String) -> Self {
        Self::with_runner(config, instructions, Arc::new(SystemCommandRunner))
    }

    /// Build a server whose external commands go through `runner`.
    pub fn with_runner(
        config: InstallerConfig,
        instructions: String,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let router = tools::build_router(Self::tool_router);
        let installer = Installer::new(&config, runner);
        Self {
            config: Arc::new(config),
            instructions: Arc::new(instructions),
            tool_router: router,
            installer: Arc::new(installer),
        }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Run a blocking install off the async executor.
    async fn run_blocking(
        &self,
        install: impl FnOnce(&Installer) -> InstallOutcome + Send + 'static,
    ) -> Result<Json<InstallOutcome>, ErrorData> {
        let installer = Arc::clone(&self.installer);
        tokio::task::spawn_blocking(move || install(installer.as_ref()))
            .await
            .map(Json)
            .map_err(|err| {
                tracing::error!(
                    target: "mcp_installer::runtime",
                    error = %err,
                    "Install task did not complete"
                );
                ErrorData::internal_error(format!("install task did not complete: {err}"), None)
            })
    }
}

#[tool_router(router = tool_router)]
impl InstallerServer {
    #[tool(
        name = "install_repo_mcp_server",
        description = "Install an MCP server published on npm (run with npx) or PyPI (run with uvx) into the config of Claude Desktop, Cursor, or VS Code"
    )]
    async fn install_repo_mcp_server(
        &self,
        Parameters(request): Parameters<InstallRepoRequest>,
    ) -> Result<Json<InstallOutcome>, ErrorData> {
        request
            .validate()
            .map_err(installer::validation_error_to_error_data)?;
        self.run_blocking(move |installer| installer.install_from_registry(&request).outcome)
            .await
    }

    #[tool(
        name = "install_local_mcp_server",
        description = "Install dependencies of a local Node.js MCP server package and register its entry point with a host application"
    )]
    async fn install_local_mcp_server(
        &self,
        Parameters(request): Parameters<InstallLocalRequest>,
    ) -> Result<Json<InstallOutcome>, ErrorData> {
        request
            .validate()
            .map_err(installer::validation_error_to_error_data)?;
        self.run_blocking(move |installer| installer.install_from_local_path(&request).outcome)
            .await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for InstallerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }
}
