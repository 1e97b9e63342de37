// src/plan/runner.rs

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, Instrument};

use crate::errors::PlanError;
use crate::exec::{AsyncTerraformExec, BoxFuture, RemoteRun, StatusUpdater, TerraformExec};
use crate::fs::{FileSystem, RealFileSystem};
use crate::plan::command::{build_plan_command, build_remote_plan_command};
use crate::plan::output::format_plan_output;
use crate::plan::planfile::{clean_path, plan_file_path, write_remote_ops_planfile};
use crate::plan::remote_ops::is_remote_ops_error;
use crate::plan::stream::consume_remote_stream;
use crate::plan::workspace::WorkspaceStepRunner;
use crate::types::ExecutionContext;
use crate::version::ToolVersion;

/// A single step of a project's workflow.
///
/// `path` is the project directory inside the checked-out repo; `extra_args`
/// come from the repo's workflow config.
pub trait StepRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        extra_args: &'a [String],
        path: &'a Path,
        envs: &'a HashMap<String, String>,
    ) -> BoxFuture<'a, Result<String, PlanError>>;
}

/// Runs `terraform plan`, falling back to a streaming remote plan when the
/// project's backend can't save plans locally.
pub struct PlanStepRunner {
    executor: Arc<dyn TerraformExec>,
    default_version: ToolVersion,
    status_updater: Arc<dyn StatusUpdater>,
    async_executor: Arc<dyn AsyncTerraformExec>,
    fs: Arc<dyn FileSystem>,
}

impl PlanStepRunner {
    pub fn new(
        executor: Arc<dyn TerraformExec>,
        default_version: ToolVersion,
        status_updater: Arc<dyn StatusUpdater>,
        async_executor: Arc<dyn AsyncTerraformExec>,
    ) -> Self {
        Self {
            executor,
            default_version,
            status_updater,
            async_executor,
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Swap the filesystem used for the var-file probe and planfile writes.
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Wrap this runner so the project's terraform workspace is selected (or
    /// created) before planning.
    pub fn with_workspace_selection(self) -> WorkspaceStepRunner<PlanStepRunner> {
        WorkspaceStepRunner::new(
            Arc::clone(&self.executor),
            self.default_version.clone(),
            self,
        )
    }

    pub fn resolve_version(&self, ctx: &ExecutionContext) -> ToolVersion {
        ctx.terraform_version
            .clone()
            .unwrap_or_else(|| self.default_version.clone())
    }

    /// Run the plan and return the normalised output.
    ///
    /// On failure the error carries the best output available; see
    /// [`PlanError::output`].
    pub async fn plan(
        &self,
        ctx: &ExecutionContext,
        extra_args: &[String],
        path: &Path,
        envs: &HashMap<String, String>,
    ) -> Result<String, PlanError> {
        self.plan_inner(ctx, extra_args, path, envs)
            .instrument(ctx.span())
            .await
    }

    async fn plan_inner(
        &self,
        ctx: &ExecutionContext,
        extra_args: &[String],
        path: &Path,
        envs: &HashMap<String, String>,
    ) -> Result<String, PlanError> {
        let version = self.resolve_version(ctx);
        let plan_file = plan_file_path(path, &ctx.workspace, &ctx.project_name);
        let args = build_plan_command(ctx, extra_args, path, &version, &plan_file, self.fs.as_ref());
        let dir = clean_path(path);

        debug!(%version, ?args, "running terraform plan");
        let outcome = self
            .executor
            .run_command(ctx, &dir, &args, envs, &version, &ctx.workspace)
            .await;

        if is_remote_ops_error(&outcome) {
            info!("detected that this project is using TFE remote ops");
            return self
                .remote_plan(ctx, extra_args, &dir, &version, &plan_file, envs)
                .await;
        }

        match outcome.error {
            Some(source) => Err(PlanError::Execution {
                output: outcome.output,
                source,
            }),
            None => Ok(format_plan_output(&outcome.output, &version)),
        }
    }

    /// Plan through the remote backend and leave a planfile behind anyway.
    ///
    /// Remote ops don't support `-out`, but later steps rely on a planfile
    /// existing for every project with an outstanding plan, and apply compares
    /// its stored text against what the remote apply prints. So the planfile
    /// is the header followed by the plan text exactly as returned: refresh
    /// preamble stripped *and* diff markers re-indented. An apply step
    /// comparing against it must normalise the remote apply output the same
    /// way.
    async fn remote_plan(
        &self,
        ctx: &ExecutionContext,
        extra_args: &[String],
        dir: &Path,
        version: &ToolVersion,
        plan_file: &Path,
        envs: &HashMap<String, String>,
    ) -> Result<String, PlanError> {
        let args = build_remote_plan_command(ctx, extra_args);

        debug!(?args, "starting async tf remote operation");
        let RemoteRun { events, .. } =
            self.async_executor
                .run_command_async(ctx, dir, &args, envs, version, &ctx.workspace);
        let streamed = consume_remote_stream(ctx, self.status_updater.as_ref(), events).await;
        debug!(run_url = %streamed.run_url, "async tf remote operation complete");

        if let Some(source) = streamed.error {
            return Err(PlanError::RemoteExecution {
                output: streamed.output,
                source,
            });
        }

        let plan_output = format_plan_output(&streamed.output, version);
        if let Err(source) = write_remote_ops_planfile(self.fs.as_ref(), plan_file, &plan_output) {
            return Err(PlanError::Persistence {
                output: plan_output,
                source,
            });
        }
        debug!(plan_file = %plan_file.display(), "wrote remote ops planfile");

        Ok(plan_output)
    }
}

impl StepRunner for PlanStepRunner {
    fn run<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        extra_args: &'a [String],
        path: &'a Path,
        envs: &'a HashMap<String, String>,
    ) -> BoxFuture<'a, Result<String, PlanError>> {
        Box::pin(self.plan(ctx, extra_args, path, envs))
    }
}
