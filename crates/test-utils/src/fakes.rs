use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::mpsc;

use planstep::errors::ExecError;
use planstep::exec::{
    AsyncTerraformExec, BoxFuture, ExecOutcome, RemoteRun, StatusUpdater, StreamEvent,
    TerraformExec,
};
use planstep::types::{CommandName, CommitStatus, ExecutionContext};
use planstep::version::ToolVersion;

/// One recorded executor call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecCall {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub envs: HashMap<String, String>,
    pub version: ToolVersion,
    pub workspace: String,
}

/// Canned response for `FakeTerraformExecutor`.
#[derive(Debug, Clone)]
pub enum Scripted {
    Ok(String),
    Err(String),
}

/// A fake capture executor that:
/// - records every call,
/// - answers from a queue of scripted outcomes (success with empty output once
///   the queue runs dry).
#[derive(Clone, Default)]
pub struct FakeTerraformExecutor {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<ExecCall>>>,
}

impl FakeTerraformExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_ok(self, output: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Ok(output.to_string()));
        self
    }

    pub fn respond_err(self, output: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Err(output.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TerraformExec for FakeTerraformExecutor {
    fn run_command<'a>(
        &'a self,
        _ctx: &'a ExecutionContext,
        path: &'a Path,
        args: &'a [String],
        envs: &'a HashMap<String, String>,
        version: &'a ToolVersion,
        workspace: &'a str,
    ) -> BoxFuture<'a, ExecOutcome> {
        self.calls.lock().unwrap().push(ExecCall {
            path: path.to_path_buf(),
            args: args.to_vec(),
            envs: envs.clone(),
            version: version.clone(),
            workspace: workspace.to_string(),
        });
        let response = self.responses.lock().unwrap().pop_front();

        Box::pin(async move {
            match response {
                None => ExecOutcome::success(""),
                Some(Scripted::Ok(output)) => ExecOutcome::success(output),
                Some(Scripted::Err(output)) => ExecOutcome::failure(
                    output,
                    ExecError::ExitStatus {
                        command: args.join(" "),
                        dir: path.display().to_string(),
                        code: 1,
                    },
                ),
            }
        })
    }
}

/// One item a `FakeAsyncExecutor` will emit.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    Line(String),
    Fail(String),
}

/// A fake streaming executor that records calls and replays scripted events
/// from a spawned producer task.
#[derive(Clone, Default)]
pub struct FakeAsyncExecutor {
    events: Arc<Mutex<Vec<ScriptedEvent>>>,
    calls: Arc<Mutex<Vec<ExecCall>>>,
}

impl FakeAsyncExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(self, line: &str) -> Self {
        self.events
            .lock()
            .unwrap()
            .push(ScriptedEvent::Line(line.to_string()));
        self
    }

    pub fn lines(self, lines: &[&str]) -> Self {
        lines.iter().fold(self, |fake, l| fake.line(l))
    }

    pub fn fail(self, message: &str) -> Self {
        self.events
            .lock()
            .unwrap()
            .push(ScriptedEvent::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl AsyncTerraformExec for FakeAsyncExecutor {
    fn run_command_async(
        &self,
        _ctx: &ExecutionContext,
        path: &Path,
        args: &[String],
        envs: &HashMap<String, String>,
        version: &ToolVersion,
        workspace: &str,
    ) -> RemoteRun {
        self.calls.lock().unwrap().push(ExecCall {
            path: path.to_path_buf(),
            args: args.to_vec(),
            envs: envs.clone(),
            version: version.clone(),
            workspace: workspace.to_string(),
        });

        let script = self.events.lock().unwrap().clone();
        let (tx, rx) = mpsc::channel::<StreamEvent>(4);
        let task = tokio::spawn(async move {
            for item in script {
                let event = match item {
                    ScriptedEvent::Line(line) => StreamEvent::Line(line),
                    ScriptedEvent::Fail(message) => StreamEvent::Failed(ExecError::Other(message)),
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        RemoteRun { task, events: rx }
    }
}

/// One recorded status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCall {
    pub command: CommandName,
    pub status: CommitStatus,
    pub url: String,
}

/// Status updater that records every update and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingStatusUpdater {
    calls: Arc<Mutex<Vec<StatusCall>>>,
    fail: bool,
}

impl RecordingStatusUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the update, then report an error for it.
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<StatusCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatusUpdater for RecordingStatusUpdater {
    fn update_project<'a>(
        &'a self,
        _ctx: &'a ExecutionContext,
        command: CommandName,
        status: CommitStatus,
        url: &'a str,
        _detail: Option<&'a str>,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        self.calls.lock().unwrap().push(StatusCall {
            command,
            status,
            url: url.to_string(),
        });
        let fail = self.fail;

        Box::pin(async move {
            if fail {
                Err(anyhow!("status API unavailable"))
            } else {
                Ok(())
            }
        })
    }
}
