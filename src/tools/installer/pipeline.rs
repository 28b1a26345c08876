//! Install requests as an ordered list of stages that stops at the first failure.

use std::{path::PathBuf, sync::Arc};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    lib::{
        errors::InstallError,
        fs::FileLocks,
        hosts::{HostConfigLocation, HostIdentity, HostRoots, Platform},
        telemetry::InstallSpan,
    },
    server::config::{HostsConfig, InstallerConfig, RuntimesConfig},
};

use super::{
    local::{ensure_local_package, install_local_package, select_entry_point},
    merge::{merge_server_entry, ServerEntry},
    probe::CommandRunner,
    registry::{resolve_launch_strategy, server_name_for},
    request::{parse_env_vars, InstallLocalRequest, InstallRepoRequest},
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateHost,
    ResolveStrategy,
    InstallPackage,
    MergeConfig,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::ValidateHost => "validate_host",
            Stage::ResolveStrategy => "resolve_strategy",
            Stage::InstallPackage => "install_package",
            Stage::MergeConfig => "merge_config",
        }
    }
}

/// Record of which stages ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineRun {
    completed: Vec<Stage>,
    failed: Option<Stage>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one stage; nothing runs after a stage has failed.
    pub fn stage<T>(
        &mut self,
        stage: Stage,
        step: impl FnOnce() -> Result<T, InstallError>,
    ) -> Result<T, InstallError> {
        debug!(target: "mcp_installer::install", stage = stage.as_str(), "Entering stage");
        match step() {
            Ok(value) => {
                self.completed.push(stage);
                Ok(value)
            }
            Err(err) => {
                warn!(
                    target: "mcp_installer::install",
                    stage = stage.as_str(),
                    reason = %err,
                    "Stage failed"
                );
                self.failed = Some(stage);
                Err(err)
            }
        }
    }

    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    pub fn failed(&self) -> Option<Stage> {
        self.failed
    }
}

/// Result reported to the caller of an install operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutcome {
    pub succeeded: bool,
    pub message: String,
}

impl InstallOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failure(err: &InstallError) -> Self {
        Self {
            succeeded: false,
            message: err.to_string(),
        }
    }
}

/// Outcome plus the stage record, kept together for logging and tests.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub outcome: InstallOutcome,
    pub run: PipelineRun,
    /// Entry written on success.
    pub registered: Option<RegisteredServer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredServer {
    pub host: HostIdentity,
    pub name: String,
    pub entry: ServerEntry,
    pub config_path: PathBuf,
}

/// Runs install requests against host configs on this machine.
#[derive(Clone)]
pub struct Installer {
    runtimes: RuntimesConfig,
    hosts: HostsConfig,
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
    locks: FileLocks,
}

impl Installer {
    pub fn new(config: &InstallerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runtimes: config.runtimes.clone(),
            hosts: config.hosts.clone(),
            platform: Platform::current(),
            runner,
            locks: FileLocks::new(),
        }
    }

    /// Override the platform family used for path resolution.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn default_host(&self) -> HostIdentity {
        self.hosts.default_host
    }

    /// Compute where `host` keeps its config, without touching the filesystem.
    pub fn locate(&self, host: HostIdentity) -> Result<HostConfigLocation, InstallError> {
        let roots = HostRoots::resolve(
            self.hosts.home_dir.as_deref(),
            self.hosts.app_data_dir.as_deref(),
        )?;
        Ok(HostConfigLocation::resolve(host, self.platform, &roots))
    }

    /// Register a published package: host check, runner choice, config merge.
    pub fn install_from_registry(&self, request: &InstallRepoRequest) -> InstallReport {
        let span = InstallSpan::start("install_repo_mcp_server");
        let mut run = PipelineRun::new();
        let result = span.span().in_scope(|| {
            let package = request.name.trim();
            let location = run.stage(Stage::ValidateHost, || self.validated_location(request.host))?;
            let strategy = run.stage(Stage::ResolveStrategy, || {
                resolve_launch_strategy(self.runner.as_ref(), &self.runtimes, package)
            })?;

            let mut args = Vec::with_capacity(request.args.len() + 1);
            args.push(package.to_string());
            args.extend(request.args.iter().cloned());
            let entry = ServerEntry::new(
                strategy.command(&self.runtimes),
                args,
                parse_env_vars(&request.env),
            );
            self.register(&mut run, location, server_name_for(package), entry)
        });
        finish(span, run, result)
    }

    /// Register a local package: host check, manifest check, `npm install`, config merge.
    pub fn install_from_local_path(&self, request: &InstallLocalRequest) -> InstallReport {
        let span = InstallSpan::start("install_local_mcp_server");
        let mut run = PipelineRun::new();
        let host = request.host.unwrap_or(self.hosts.default_host);
        let result = span.span().in_scope(|| {
            let dir = request.path.as_path();
            let location = run.stage(Stage::ValidateHost, || self.validated_location(host))?;
            run.stage(Stage::ResolveStrategy, || ensure_local_package(dir))?;
            let entry_point = run.stage(Stage::InstallPackage, || {
                let entry_points = install_local_package(self.runner.as_ref(), &self.runtimes, dir)?;
                select_entry_point(dir, entry_points)
            })?;

            let mut args = Vec::with_capacity(request.args.len() + 1);
            args.push(entry_point.path.to_string_lossy().into_owned());
            args.extend(request.args.iter().cloned());
            let entry = ServerEntry::new(self.runtimes.node.clone(), args, parse_env_vars(&request.env));
            self.register(&mut run, location, &entry_point.name, entry)
        });
        finish(span, run, result)
    }

    fn validated_location(&self, host: HostIdentity) -> Result<HostConfigLocation, InstallError> {
        let location = self.locate(host)?;
        location.ensure_installed()?;
        Ok(location)
    }

    fn register(
        &self,
        run: &mut PipelineRun,
        location: HostConfigLocation,
        name: &str,
        entry: ServerEntry,
    ) -> Result<RegisteredServer, InstallError> {
        run.stage(Stage::MergeConfig, || {
            self.locks
                .with_lock(&location.file, || merge_server_entry(&location, name, &entry))
        })?;
        Ok(RegisteredServer {
            host: location.host,
            name: name.to_string(),
            entry,
            config_path: location.file,
        })
    }
}

fn finish(
    span: InstallSpan,
    run: PipelineRun,
    result: Result<RegisteredServer, InstallError>,
) -> InstallReport {
    let (outcome, registered) = match result {
        Ok(registered) => (success_outcome(&registered), Some(registered)),
        Err(err) => (InstallOutcome::failure(&err), None),
    };
    span.finish(outcome.succeeded, run.failed().map(|stage| stage.as_str()));
    InstallReport {
        outcome,
        run,
        registered,
    }
}

fn success_outcome(registered: &RegisteredServer) -> InstallOutcome {
    InstallOutcome::success(format!(
        "Installed MCP server '{name}' into {host} using `{command}` (config: {path}). Restart {host} for the changes to take effect.",
        name = registered.name,
        host = registered.host,
        command = registered.entry.command,
        path = registered.config_path.display(),
    ))
}
