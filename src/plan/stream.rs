// src/plan/stream.rs

//! Consuming the live output of a remote-ops plan.
//!
//! Terraform prints a link to the remote run right after
//! [`LINE_BEFORE_RUN_URL`]. As soon as we see it, the commit status is set to
//! pending with that link so people can follow the run while it's still going.
//! When the stream ends the status becomes success or failed, pointing at the
//! same link.

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::errors::ExecError;
use crate::exec::{StatusUpdater, StreamEvent};
use crate::types::{CommandName, CommitStatus, ExecutionContext};

/// Line terraform prints immediately before the run URL.
pub const LINE_BEFORE_RUN_URL: &str = "To view this run in a browser, visit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlWatch {
    WatchingForMarker,
    ExpectingUrl,
}

/// What a fully consumed (or aborted) stream produced.
#[derive(Debug)]
pub struct StreamOutcome {
    /// Every line received, joined with `\n`.
    pub output: String,
    /// Last run URL seen; empty if terraform never printed one.
    pub run_url: String,
    pub error: Option<ExecError>,
}

/// Drain `events` in order, updating the commit status along the way.
///
/// Stops at the first [`StreamEvent::Failed`]; lines received up to that point
/// are kept. Status update failures are logged and otherwise ignored.
pub async fn consume_remote_stream(
    ctx: &ExecutionContext,
    status_updater: &dyn StatusUpdater,
    mut events: mpsc::Receiver<StreamEvent>,
) -> StreamOutcome {
    let mut lines: Vec<String> = Vec::new();
    let mut state = UrlWatch::WatchingForMarker;
    let mut run_url = String::new();
    let mut failure = None;

    while let Some(event) = events.recv().await {
        let line = match event {
            StreamEvent::Line(line) => line,
            StreamEvent::Failed(err) => {
                failure = Some(err);
                break;
            }
        };

        match state {
            _ if line == LINE_BEFORE_RUN_URL => state = UrlWatch::ExpectingUrl,
            UrlWatch::ExpectingUrl => {
                run_url = line.trim().to_string();
                debug!(run_url = %run_url, "remote run url found, updating commit status");
                update_status(ctx, status_updater, CommitStatus::Pending, &run_url).await;
                state = UrlWatch::WatchingForMarker;
            }
            UrlWatch::WatchingForMarker => {}
        }

        lines.push(line);
    }

    let final_status = if failure.is_some() {
        CommitStatus::Failed
    } else {
        CommitStatus::Success
    };
    update_status(ctx, status_updater, final_status, &run_url).await;

    StreamOutcome {
        output: lines.join("\n"),
        run_url,
        error: failure,
    }
}

async fn update_status(
    ctx: &ExecutionContext,
    status_updater: &dyn StatusUpdater,
    status: CommitStatus,
    url: &str,
) {
    if let Err(err) = status_updater
        .update_project(ctx, CommandName::Plan, status, url, None)
        .await
    {
        error!(%status, error = %err, "unable to update status");
    }
}
