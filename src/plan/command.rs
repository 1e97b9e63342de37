// src/plan/command.rs

//! Building the argument lists for `terraform plan`.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::policy::should_inject_legacy_vars;
use crate::types::ExecutionContext;
use crate::version::ToolVersion;

/// Double-quote `s`, escaping quotes and backslashes.
///
/// Commands run through `sh -c`, and Bitbucket Server owner names may contain
/// spaces.
pub fn quote(s: &str) -> String {
    format!("{s:?}")
}

/// Path of the optional per-workspace var file.
pub fn var_file_path(path: &Path, workspace: &str) -> PathBuf {
    path.join("env").join(format!("{workspace}.tfvars"))
}

/// `-var` pairs identifying who and which repo the plan runs for, e.g. for
/// naming AWS sessions. Only terraform < 0.12 gets them; later versions fail
/// on `-var` flags for undeclared variables.
///
/// The order is fixed.
pub fn legacy_vars(ctx: &ExecutionContext, version: &ToolVersion) -> Vec<String> {
    if !should_inject_legacy_vars(version) {
        return Vec::new();
    }

    vec![
        "-var".to_string(),
        format!("atlantis_user={}", quote(&ctx.user.username)),
        "-var".to_string(),
        format!("atlantis_repo={}", quote(&ctx.base_repo.full_name)),
        "-var".to_string(),
        format!("atlantis_repo_name={}", quote(&ctx.base_repo.name)),
        "-var".to_string(),
        format!("atlantis_repo_owner={}", quote(&ctx.base_repo.owner)),
        "-var".to_string(),
        format!("atlantis_pull_num={}", ctx.pull.num),
    ]
}

/// Arguments for a normal plan that saves its result to `plan_file`.
pub fn build_plan_command(
    ctx: &ExecutionContext,
    extra_args: &[String],
    path: &Path,
    version: &ToolVersion,
    plan_file: &Path,
    fs: &dyn FileSystem,
) -> Vec<String> {
    let mut args = vec![
        "plan".to_string(),
        "-input=false".to_string(),
        "-refresh".to_string(),
        "-out".to_string(),
        quote(&plan_file.display().to_string()),
    ];
    args.extend(legacy_vars(ctx, version));
    args.extend(extra_args.iter().cloned());
    args.extend(ctx.escaped_comment_args.iter().cloned());

    let var_file = var_file_path(path, &ctx.workspace);
    if fs.exists(&var_file) {
        args.push("-var-file".to_string());
        args.push(var_file.display().to_string());
    }

    args
}

/// Arguments for a plan against a remote-ops backend. Those reject `-out`,
/// so nothing is saved and the run is kept minimal.
pub fn build_remote_plan_command(ctx: &ExecutionContext, extra_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "plan".to_string(),
        "-input=false".to_string(),
        "-refresh".to_string(),
        "-no-color".to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args.extend(ctx.escaped_comment_args.iter().cloned());
    args
}
