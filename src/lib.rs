// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod plan;
pub mod policy;
pub mod types;
pub mod version;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::exec::{LoggingStatusUpdater, RealTerraformExecutor};
use crate::fs::RealFileSystem;
use crate::plan::command::{build_plan_command, build_remote_plan_command};
use crate::plan::planfile::plan_file_path;
use crate::plan::{PlanStepRunner, StepRunner};
use crate::types::{ExecutionContext, PullRequest, Repo, User};
use crate::version::ToolVersion;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the real terraform executor (capture + streaming)
/// - a logging-only commit status updater
/// - the plan step, optionally behind workspace selection
///
/// The plan output is printed to stdout, also when the plan fails.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let ctx = context_from_args(&args)?;
    let path = Path::new(&args.dir);

    let executor = Arc::new(
        RealTerraformExecutor::new(cfg.terraform.binary.clone())
            .with_envs(cfg.env.clone().into_iter().collect()),
    );

    if args.dry_run {
        print_dry_run(&cfg, &ctx, &args, &executor);
        return Ok(());
    }

    let runner = PlanStepRunner::new(
        executor.clone(),
        cfg.terraform.default_version.clone(),
        Arc::new(LoggingStatusUpdater),
        executor,
    );
    info!(version = %runner.resolve_version(&ctx), dir = %args.dir, "running plan");

    let envs = HashMap::new();
    let result = if args.no_workspace_select {
        runner.run(&ctx, &args.extra_args, path, &envs).await
    } else {
        runner
            .with_workspace_selection()
            .run(&ctx, &args.extra_args, path, &envs)
            .await
    };

    match result {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            if !err.output().is_empty() {
                println!("{}", err.output());
            }
            Err(err.into())
        }
    }
}

fn context_from_args(args: &CliArgs) -> Result<ExecutionContext> {
    let terraform_version = args
        .tf_version
        .as_deref()
        .map(str::parse::<ToolVersion>)
        .transpose()?;

    Ok(ExecutionContext {
        workspace: args.workspace.clone(),
        project_name: args.project.clone(),
        terraform_version,
        user: User {
            username: args.user.clone(),
        },
        base_repo: Repo::from_full_name(&args.repo),
        pull: PullRequest { num: args.pull },
        escaped_comment_args: args.comment_args.clone(),
    })
}

/// Print both command lines the plan step could run.
fn print_dry_run(
    cfg: &ConfigFile,
    ctx: &ExecutionContext,
    args: &CliArgs,
    executor: &RealTerraformExecutor,
) {
    let path = Path::new(&args.dir);
    let version = ctx
        .terraform_version
        .clone()
        .unwrap_or_else(|| cfg.terraform.default_version.clone());
    let plan_file = plan_file_path(path, &ctx.workspace, &ctx.project_name);

    let plan = build_plan_command(ctx, &args.extra_args, path, &version, &plan_file, &RealFileSystem);
    let remote = build_remote_plan_command(ctx, &args.extra_args);

    println!("planstep dry-run");
    println!("  terraform version = {version}");
    println!("  planfile          = {}", plan_file.display());
    println!("  plan:        {}", executor.shell_command(&plan));
    println!("  remote plan: {}", executor.shell_command(&remote));
    if !cfg.env.is_empty() {
        println!("  env: {:?}", cfg.env.keys().collect::<Vec<_>>());
    }

    debug!("dry-run complete (no execution)");
}
