// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `planstep`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "planstep",
    version,
    about = "Run terraform plan for a pull request, with remote-ops fallback.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Missing file means defaults.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Project directory to plan in.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: String,

    /// Terraform workspace.
    #[arg(long, default_value = "default")]
    pub workspace: String,

    /// Project name; used for the planfile name.
    #[arg(long, default_value = "")]
    pub project: String,

    /// Terraform version of this project, overriding the configured default.
    #[arg(long, value_name = "VERSION")]
    pub tf_version: Option<String>,

    /// Repository the pull request targets, as `owner/name`.
    #[arg(long, default_value = "")]
    pub repo: String,

    /// User who requested the plan.
    #[arg(long, default_value = "")]
    pub user: String,

    /// Pull request number.
    #[arg(long, default_value_t = 0)]
    pub pull: u64,

    /// Already-escaped argument from the pull request comment. Repeatable.
    #[arg(long = "comment-arg", value_name = "ARG")]
    pub comment_args: Vec<String>,

    /// Skip selecting the terraform workspace before planning.
    #[arg(long)]
    pub no_workspace_select: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PLANSTEP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the plan command lines without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Extra arguments appended to `terraform plan`.
    #[arg(last = true, value_name = "EXTRA_ARGS")]
    pub extra_args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
