// tests/remote_stream.rs

use std::error::Error;

use tokio::sync::mpsc;

use planstep::errors::ExecError;
use planstep::exec::StreamEvent;
use planstep::plan::{consume_remote_stream, LINE_BEFORE_RUN_URL};
use planstep::types::CommitStatus;
use planstep_test_utils::builders::ContextBuilder;
use planstep_test_utils::fakes::RecordingStatusUpdater;
use planstep_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn statuses(updater: &RecordingStatusUpdater) -> Vec<(CommitStatus, String)> {
    updater
        .calls()
        .into_iter()
        .map(|c| (c.status, c.url))
        .collect()
}

#[tokio::test]
async fn clean_stream_without_url_reports_success_with_empty_url() -> TestResult {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel(8);

    tx.send(StreamEvent::Line("a".into())).await?;
    tx.send(StreamEvent::Line("b".into())).await?;
    drop(tx);

    let outcome = with_timeout(consume_remote_stream(&ctx, &updater, rx)).await;

    assert_eq!(outcome.output, "a\nb");
    assert_eq!(outcome.run_url, "");
    assert!(outcome.error.is_none());
    assert_eq!(statuses(&updater), vec![(CommitStatus::Success, String::new())]);
    Ok(())
}

#[tokio::test]
async fn empty_stream_is_a_success_with_empty_output() {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel::<StreamEvent>(1);
    drop(tx);

    let outcome = consume_remote_stream(&ctx, &updater, rx).await;

    assert_eq!(outcome.output, "");
    assert_eq!(statuses(&updater), vec![(CommitStatus::Success, String::new())]);
}

#[tokio::test]
async fn every_url_after_a_marker_triggers_pending() -> TestResult {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel(16);

    // Producer runs concurrently with the consumer.
    let producer = tokio::spawn(async move {
        for line in [
            LINE_BEFORE_RUN_URL,
            "https://tfe/run/1",
            "policy check...",
            LINE_BEFORE_RUN_URL,
            "\thttps://tfe/run/2 ",
            "done",
        ] {
            if tx.send(StreamEvent::Line(line.to_string())).await.is_err() {
                break;
            }
        }
    });

    let outcome = with_timeout(consume_remote_stream(&ctx, &updater, rx)).await;
    producer.await?;

    assert_eq!(outcome.run_url, "https://tfe/run/2");
    assert_eq!(
        statuses(&updater),
        vec![
            (CommitStatus::Pending, "https://tfe/run/1".to_string()),
            (CommitStatus::Pending, "https://tfe/run/2".to_string()),
            (CommitStatus::Success, "https://tfe/run/2".to_string()),
        ]
    );
    assert_eq!(outcome.output.lines().count(), 6);
    assert!(outcome.output.contains("\thttps://tfe/run/2 "), "raw line kept untrimmed");
    Ok(())
}

#[tokio::test]
async fn repeated_marker_keeps_waiting_for_the_url() -> TestResult {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel(8);

    for line in [LINE_BEFORE_RUN_URL, LINE_BEFORE_RUN_URL, "https://tfe/run/3"] {
        tx.send(StreamEvent::Line(line.to_string())).await?;
    }
    drop(tx);

    let outcome = consume_remote_stream(&ctx, &updater, rx).await;

    assert_eq!(outcome.run_url, "https://tfe/run/3");
    assert_eq!(
        statuses(&updater),
        vec![
            (CommitStatus::Pending, "https://tfe/run/3".to_string()),
            (CommitStatus::Success, "https://tfe/run/3".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn marker_must_match_exactly() -> TestResult {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel(8);

    tx.send(StreamEvent::Line(format!("  {LINE_BEFORE_RUN_URL}"))).await?;
    tx.send(StreamEvent::Line("https://tfe/run/4".into())).await?;
    drop(tx);

    let outcome = consume_remote_stream(&ctx, &updater, rx).await;

    assert_eq!(outcome.run_url, "");
    assert_eq!(statuses(&updater), vec![(CommitStatus::Success, String::new())]);
    Ok(())
}

#[tokio::test]
async fn failure_stops_consumption_and_keeps_last_url() -> TestResult {
    init_tracing();

    let ctx = ContextBuilder::new().build();
    let updater = RecordingStatusUpdater::new();
    let (tx, rx) = mpsc::channel(8);

    tx.send(StreamEvent::Line(LINE_BEFORE_RUN_URL.into())).await?;
    tx.send(StreamEvent::Line("https://tfe/run/5".into())).await?;
    tx.send(StreamEvent::Failed(ExecError::Other("boom".into()))).await?;
    tx.send(StreamEvent::Line("after failure".into())).await?;
    drop(tx);

    let outcome = consume_remote_stream(&ctx, &updater, rx).await;

    assert_eq!(outcome.output, format!("{LINE_BEFORE_RUN_URL}\nhttps://tfe/run/5"));
    assert!(matches!(outcome.error, Some(ExecError::Other(ref m)) if m == "boom"));
    assert_eq!(
        statuses(&updater),
        vec![
            (CommitStatus::Pending, "https://tfe/run/5".to_string()),
            (CommitStatus::Failed, "https://tfe/run/5".to_string()),
        ]
    );
    Ok(())
}
