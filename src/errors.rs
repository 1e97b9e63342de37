// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] describes why a terraform invocation failed. It never owns
//!   the command output; the output travels next to it in
//!   [`ExecOutcome`](crate::exec::ExecOutcome) or inside [`PlanError`].
//! - [`PlanError`] is what a plan step returns. Every variant keeps the best
//!   output we have so the caller can still show it on the pull request.
//! - [`PlanstepError`] covers everything around the plan step itself
//!   (config, CLI, I/O).

use thiserror::Error;

use crate::version::ToolVersion;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("spawning {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("running {command:?} in {dir:?}: exit status {code}")]
    ExitStatus {
        command: String,
        dir: String,
        code: i32,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("{source}")]
    Execution {
        output: String,
        #[source]
        source: ExecError,
    },

    #[error("remote plan failed: {source}")]
    RemoteExecution {
        output: String,
        #[source]
        source: ExecError,
    },

    #[error("unable to create planfile for remote ops: {source}")]
    Persistence {
        output: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("terraform version {version} does not support workspaces (workspace {workspace:?})")]
    WorkspacesUnsupported {
        version: ToolVersion,
        workspace: String,
    },

    #[error("switching to workspace {workspace:?}: {source}: {output}")]
    Workspace {
        workspace: String,
        output: String,
        #[source]
        source: ExecError,
    },
}

impl PlanError {
    /// Best-available output for this failure: raw tool output for execution
    /// failures, normalized plan text for a failed planfile write.
    pub fn output(&self) -> &str {
        match self {
            PlanError::Execution { output, .. }
            | PlanError::RemoteExecution { output, .. }
            | PlanError::Persistence { output, .. }
            | PlanError::Workspace { output, .. } => output,
            PlanError::WorkspacesUnsupported { .. } => "",
        }
    }
}

#[derive(Error, Debug)]
pub enum PlanstepError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid terraform version {input:?}: {source}")]
    VersionError {
        input: String,
        #[source]
        source: semver::Error,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlanstepError>;
