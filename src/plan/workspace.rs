// src/plan/workspace.rs

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, Instrument};

use crate::errors::PlanError;
use crate::exec::{BoxFuture, TerraformExec};
use crate::plan::planfile::clean_path;
use crate::plan::runner::StepRunner;
use crate::policy::{can_show_workspace, supports_workspaces, workspace_subcommand};
use crate::types::{ExecutionContext, DEFAULT_WORKSPACE};
use crate::version::ToolVersion;

/// Selects the project's terraform workspace, then runs the wrapped step.
///
/// - terraform < 0.9 has no workspaces: only `default` is allowed.
/// - 0.9.x uses `terraform env select/new`.
/// - >= 0.10 asks `terraform workspace show` first and skips the switch when
///   already on the right workspace.
///
/// A missing workspace is created with `new` when `select` fails.
pub struct WorkspaceStepRunner<R> {
    executor: Arc<dyn TerraformExec>,
    default_version: ToolVersion,
    delegate: R,
}

impl<R: StepRunner> WorkspaceStepRunner<R> {
    pub fn new(executor: Arc<dyn TerraformExec>, default_version: ToolVersion, delegate: R) -> Self {
        Self {
            executor,
            default_version,
            delegate,
        }
    }

    async fn run_inner(
        &self,
        ctx: &ExecutionContext,
        extra_args: &[String],
        path: &Path,
        envs: &HashMap<String, String>,
    ) -> Result<String, PlanError> {
        let version = ctx
            .terraform_version
            .clone()
            .unwrap_or_else(|| self.default_version.clone());

        if !supports_workspaces(&version) {
            if ctx.workspace != DEFAULT_WORKSPACE {
                return Err(PlanError::WorkspacesUnsupported {
                    version,
                    workspace: ctx.workspace.clone(),
                });
            }
            return self.delegate.run(ctx, extra_args, path, envs).await;
        }

        self.switch_workspace(ctx, path, &version, envs)
            .instrument(ctx.span())
            .await?;
        self.delegate.run(ctx, extra_args, path, envs).await
    }

    async fn switch_workspace(
        &self,
        ctx: &ExecutionContext,
        path: &Path,
        version: &ToolVersion,
        envs: &HashMap<String, String>,
    ) -> Result<(), PlanError> {
        let dir = clean_path(path);
        let subcommand = workspace_subcommand(version);
        let workspace = ctx.workspace.as_str();

        if can_show_workspace(version) {
            let show = vec![subcommand.to_string(), "show".to_string()];
            let outcome = self
                .executor
                .run_command(ctx, &dir, &show, envs, version, workspace)
                .await;
            if let Some(source) = outcome.error {
                return Err(PlanError::Workspace {
                    workspace: workspace.to_string(),
                    output: outcome.output,
                    source,
                });
            }
            if outcome.output.trim() == workspace {
                debug!("already on the requested workspace");
                return Ok(());
            }
        }

        // Select, creating the workspace if it doesn't exist yet.
        let select = workspace_args(subcommand, "select", workspace);
        let outcome = self
            .executor
            .run_command(ctx, &dir, &select, envs, version, workspace)
            .await;
        if outcome.is_success() {
            debug!(%subcommand, "selected workspace");
            return Ok(());
        }

        debug!(%subcommand, "workspace select failed, creating it");
        let new = workspace_args(subcommand, "new", workspace);
        let outcome = self
            .executor
            .run_command(ctx, &dir, &new, envs, version, workspace)
            .await;
        match outcome.error {
            Some(source) => Err(PlanError::Workspace {
                workspace: workspace.to_string(),
                output: outcome.output,
                source,
            }),
            None => Ok(()),
        }
    }
}

fn workspace_args(subcommand: &str, action: &str, workspace: &str) -> Vec<String> {
    vec![
        subcommand.to_string(),
        action.to_string(),
        "-no-color".to_string(),
        workspace.to_string(),
    ]
}

impl<R: StepRunner> StepRunner for WorkspaceStepRunner<R> {
    fn run<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        extra_args: &'a [String],
        path: &'a Path,
        envs: &'a HashMap<String, String>,
    ) -> BoxFuture<'a, Result<String, PlanError>> {
        Box::pin(self.run_inner(ctx, extra_args, path, envs))
    }
}
