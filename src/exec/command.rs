// src/exec/command.rs

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::backend::{
    AsyncTerraformExec, BoxFuture, ExecOutcome, RemoteRun, StreamEvent, TerraformExec,
};
use crate::types::ExecutionContext;
use crate::version::ToolVersion;

/// Capacity of the line channel between a running process and its consumer.
const STREAM_BUFFER: usize = 64;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ANSI regex"));

/// Remove terminal colour/cursor escape sequences.
pub fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE.replace_all(s, "").into_owned()
}

/// Runs the terraform binary through the platform shell.
///
/// Arguments are joined with spaces and handed to `sh -c`, which is why the
/// command builder quotes paths that may contain spaces. Both stdout and
/// stderr are read, each by its own task: lines keep their order within a
/// stream, but how stdout and stderr lines interleave is not fixed. Output
/// has ANSI escapes removed and invalid UTF-8 replaced.
#[derive(Debug, Clone)]
pub struct RealTerraformExecutor {
    binary: String,
    default_envs: HashMap<String, String>,
}

impl RealTerraformExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            default_envs: HashMap::new(),
        }
    }

    /// Environment variables applied to every invocation, before the
    /// per-call ones.
    pub fn with_envs(mut self, envs: HashMap<String, String>) -> Self {
        self.default_envs = envs;
        self
    }

    pub fn shell_command(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    fn build_command(
        &self,
        tf_cmd: &str,
        path: &Path,
        envs: &HashMap<String, String>,
        version: &ToolVersion,
        workspace: &str,
    ) -> Command {
        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(tf_cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(tf_cmd);
            c
        };

        cmd.current_dir(path)
            .envs(&self.default_envs)
            .envs(envs)
            .env("WORKSPACE", workspace)
            .env("ATLANTIS_TERRAFORM_VERSION", version.to_string())
            .env("DIR", path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_streaming(
        &self,
        ctx: &ExecutionContext,
        path: &Path,
        args: &[String],
        envs: &HashMap<String, String>,
        version: &ToolVersion,
        workspace: &str,
    ) -> RemoteRun {
        let tf_cmd = self.shell_command(args);
        let cmd = self.build_command(&tf_cmd, path, envs, version, workspace);
        let dir = path.display().to_string();
        let project = ctx.project_name.clone();

        info!(project = %project, cmd = %tf_cmd, dir = %dir, "starting terraform process");

        let (tx, rx) = mpsc::channel::<StreamEvent>(STREAM_BUFFER);
        let task = tokio::spawn(async move {
            if let Err(err) = stream_process(cmd, &tf_cmd, &dir, &tx).await {
                warn!(project = %project, error = %err, "terraform process failed");
                let _ = tx.send(StreamEvent::Failed(err)).await;
            }
        });

        RemoteRun { task, events: rx }
    }
}

async fn stream_process(
    mut cmd: Command,
    tf_cmd: &str,
    dir: &str,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<(), ExecError> {
    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: tf_cmd.to_string(),
        source,
    })?;

    let stdout = child.stdout.take().map(|s| tokio::spawn(forward_lines(s, tx.clone())));
    let stderr = child.stderr.take().map(|s| tokio::spawn(forward_lines(s, tx.clone())));

    let status = child
        .wait()
        .await
        .map_err(|e| ExecError::Other(format!("waiting for {tf_cmd:?}: {e}")))?;

    // Every line must be delivered before the exit status is reported.
    for reader in [stdout, stderr].into_iter().flatten() {
        let _ = reader.await;
    }

    let code = status.code().unwrap_or(-1);
    debug!(cmd = %tf_cmd, exit_code = code, success = status.success(), "terraform process exited");

    if status.success() {
        Ok(())
    } else {
        Err(ExecError::ExitStatus {
            command: tf_cmd.to_string(),
            dir: dir.to_string(),
            code,
        })
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::Sender<StreamEvent>)
where
    R: AsyncRead + Unpin,
{
    // Terraform output isn't guaranteed to be UTF-8; invalid bytes are
    // replaced rather than ending the stream.
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "reading terraform output failed");
                break;
            }
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        if tx.send(StreamEvent::Line(strip_ansi(&line))).await.is_err() {
            // Consumer went away; nothing left to deliver to.
            break;
        }
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

impl TerraformExec for RealTerraformExecutor {
    fn run_command<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        path: &'a Path,
        args: &'a [String],
        envs: &'a HashMap<String, String>,
        version: &'a ToolVersion,
        workspace: &'a str,
    ) -> BoxFuture<'a, ExecOutcome> {
        Box::pin(async move {
            let mut run = self.spawn_streaming(ctx, path, args, envs, version, workspace);

            let mut output = String::new();
            while let Some(event) = run.events.recv().await {
                match event {
                    StreamEvent::Line(line) => {
                        output.push_str(&line);
                        output.push('\n');
                    }
                    StreamEvent::Failed(err) => return ExecOutcome::failure(output, err),
                }
            }

            ExecOutcome::success(output)
        })
    }
}

impl AsyncTerraformExec for RealTerraformExecutor {
    fn run_command_async(
        &self,
        ctx: &ExecutionContext,
        path: &Path,
        args: &[String],
        envs: &HashMap<String, String>,
        version: &ToolVersion,
        workspace: &str,
    ) -> RemoteRun {
        self.spawn_streaming(ctx, path, args, envs, version, workspace)
    }
}
