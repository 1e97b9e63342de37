// src/exec/backend.rs

//! Pluggable collaborator abstractions.
//!
//! The plan step talks to terraform and to the commit-status API only
//! through these traits. Production code uses
//! [`RealTerraformExecutor`](super::RealTerraformExecutor) and whatever status
//! updater the caller wires in; tests substitute fakes that return canned
//! output and record every call.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::ExecError;
use crate::types::{CommandName, CommitStatus, ExecutionContext};
use crate::version::ToolVersion;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Captured result of one terraform invocation.
///
/// A failed invocation is still a value: the output is needed to decide
/// whether the failure is the remote-ops one we can recover from.
#[derive(Debug)]
pub struct ExecOutcome {
    pub output: String,
    pub error: Option<ExecError>,
}

impl ExecOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(output: impl Into<String>, error: ExecError) -> Self {
        Self {
            output: output.into(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// One item of a streaming terraform run.
#[derive(Debug)]
pub enum StreamEvent {
    Line(String),
    /// Terminal: the run failed. Nothing useful follows it.
    Failed(ExecError),
}

/// Handle to a streaming terraform run.
///
/// `task` is the producer feeding `events`; the channel closes once the
/// producer is done.
pub struct RemoteRun {
    pub task: JoinHandle<()>,
    pub events: mpsc::Receiver<StreamEvent>,
}

/// Runs terraform and captures its whole output.
pub trait TerraformExec: Send + Sync {
    fn run_command<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        path: &'a Path,
        args: &'a [String],
        envs: &'a HashMap<String, String>,
        version: &'a ToolVersion,
        workspace: &'a str,
    ) -> BoxFuture<'a, ExecOutcome>;
}

/// Runs terraform and streams its output line by line.
///
/// Must be called from within a Tokio runtime; implementations spawn the
/// producer immediately.
pub trait AsyncTerraformExec: Send + Sync {
    fn run_command_async(
        &self,
        ctx: &ExecutionContext,
        path: &Path,
        args: &[String],
        envs: &HashMap<String, String>,
        version: &ToolVersion,
        workspace: &str,
    ) -> RemoteRun;
}

/// Updates the commit status shown on the pull request.
pub trait StatusUpdater: Send + Sync {
    fn update_project<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        command: CommandName,
        status: CommitStatus,
        url: &'a str,
        detail: Option<&'a str>,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}
