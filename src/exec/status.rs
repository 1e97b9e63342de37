// src/exec/status.rs

use tracing::info;

use crate::exec::backend::{BoxFuture, StatusUpdater};
use crate::types::{CommandName, CommitStatus, ExecutionContext};

/// Status updater that only logs.
///
/// Used by the `planstep` binary, which has no VCS credentials; the workflow
/// engine supplies a real one.
#[derive(Debug, Clone, Default)]
pub struct LoggingStatusUpdater;

impl StatusUpdater for LoggingStatusUpdater {
    fn update_project<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        command: CommandName,
        status: CommitStatus,
        url: &'a str,
        detail: Option<&'a str>,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            info!(
                repo = %ctx.base_repo.full_name,
                pull = ctx.pull.num,
                project = %ctx.project_name,
                workspace = %ctx.workspace,
                %command,
                %status,
                url = %url,
                detail = detail.unwrap_or(""),
                "commit status updated"
            );
            Ok(())
        })
    }
}
