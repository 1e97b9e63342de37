// tests/plan_runner.rs

mod common;
use crate::common::{args, harness, init_tracing, with_timeout, ContextBuilder};

use std::collections::HashMap;
use std::path::Path;

use planstep::errors::PlanError;
use planstep::fs::PLANFILE_MODE;
use planstep::plan::{StepRunner, LINE_BEFORE_RUN_URL, REMOTE_OPS_HEADER};
use planstep::policy::{REMOTE_OPS_ERR_0_12, REMOTE_OPS_ERR_1_1_0};
use planstep::types::{CommandName, CommitStatus};
use planstep_test_utils::fakes::{
    FakeAsyncExecutor, FakeTerraformExecutor, RecordingStatusUpdater, StatusCall,
};

fn status(status: CommitStatus, url: &str) -> StatusCall {
    StatusCall {
        command: CommandName::Plan,
        status,
        url: url.to_string(),
    }
}

#[tokio::test]
async fn normal_plan_strips_refresh_and_reindents() {
    init_tracing();

    let raw = "\
aws_instance.x: Refreshing state... [id=i-1]
aws_instance.y: Refreshing state... [id=i-2]
  - aws_instance.x
";
    let h = harness(
        "0.15.0",
        FakeTerraformExecutor::new().respond_ok(raw),
        FakeAsyncExecutor::new(),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new().version("1.0.0").build();
    let mut envs = HashMap::new();
    envs.insert("TF_IN_AUTOMATION".to_string(), "true".to_string());

    let output = with_timeout(h.runner.plan(&ctx, &[], Path::new("/repo/./proj"), &envs))
        .await
        .expect("plan succeeds");

    assert_eq!(output, "- aws_instance.x\n");

    let calls = h.executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, Path::new("/repo/proj"));
    assert_eq!(calls[0].version.to_string(), "1.0.0");
    assert_eq!(calls[0].workspace, "default");
    assert_eq!(calls[0].envs, envs);
    assert_eq!(
        calls[0].args,
        args(&["plan", "-input=false", "-refresh", "-out", "\"/repo/proj/default.tfplan\""])
    );

    assert!(h.async_executor.calls().is_empty());
    assert!(h.statuses.calls().is_empty());
    assert!(h.fs.paths().is_empty());
}

#[tokio::test]
async fn default_version_is_used_without_override() {
    init_tracing();

    let h = harness(
        "0.11.14",
        FakeTerraformExecutor::new().respond_ok("ok"),
        FakeAsyncExecutor::new(),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new().build();

    h.runner
        .plan(&ctx, &[], Path::new("/repo"), &HashMap::new())
        .await
        .expect("plan succeeds");

    let calls = h.executor.calls();
    assert_eq!(calls[0].version.to_string(), "0.11.14");
    assert!(calls[0].args.contains(&"atlantis_pull_num=2".to_string()));
}

#[tokio::test]
async fn genuine_failure_is_returned_verbatim() {
    init_tracing();

    let raw = "aws_instance.x: Refreshing state...\n  + nope\nError: Invalid reference\n";
    let h = harness(
        "1.0.0",
        FakeTerraformExecutor::new().respond_err(raw),
        FakeAsyncExecutor::new(),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new().build();

    let err = h
        .runner
        .plan(&ctx, &[], Path::new("/repo"), &HashMap::new())
        .await
        .expect_err("plan fails");

    match &err {
        PlanError::Execution { output, .. } => assert_eq!(output, raw),
        other => panic!("expected Execution error, got {other:?}"),
    }
    assert_eq!(err.output(), raw);
    assert_eq!(
        err.to_string(),
        "running \"plan -input=false -refresh -out \\\"/repo/default.tfplan\\\"\" in \"/repo\": exit status 1"
    );
    assert!(h.async_executor.calls().is_empty());
    assert!(h.statuses.calls().is_empty());
}

#[tokio::test]
async fn remote_ops_signature_in_successful_output_is_ignored() {
    init_tracing();

    let h = harness(
        "1.0.0",
        FakeTerraformExecutor::new().respond_ok(REMOTE_OPS_ERR_1_1_0),
        FakeAsyncExecutor::new(),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new().build();

    h.runner
        .plan(&ctx, &[], Path::new("/repo"), &HashMap::new())
        .await
        .expect("plan succeeds");

    assert!(h.async_executor.calls().is_empty());
}

#[tokio::test]
async fn remote_ops_fallback_streams_and_writes_planfile() {
    init_tracing();

    let url = "https://app.example.com/run/123";
    let h = harness(
        "1.0.0",
        FakeTerraformExecutor::new()
            .respond_err(&format!("Running plan...\n{REMOTE_OPS_ERR_1_1_0}")),
        FakeAsyncExecutor::new().lines(&[
            "Running plan in the remote backend. Output will stream here.",
            "",
            LINE_BEFORE_RUN_URL,
            &format!("  {url}  "),
            "",
            "aws_instance.x: Refreshing state... [id=i-1]",
            "Terraform will perform the following actions:",
            "  + aws_instance.y",
        ]),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new()
        .version("1.1.0")
        .project("infra/web")
        .comment_arg("-target=aws_instance.y")
        .build();

    let output = with_timeout(h.runner.plan(
        &ctx,
        &args(&["-lock=false"]),
        Path::new("/repo/proj"),
        &HashMap::new(),
    ))
    .await
    .expect("remote plan succeeds");

    assert_eq!(
        output,
        "Terraform will perform the following actions:\n+ aws_instance.y"
    );

    let remote_calls = h.async_executor.calls();
    assert_eq!(remote_calls.len(), 1);
    assert_eq!(
        remote_calls[0].args,
        args(&[
            "plan",
            "-input=false",
            "-refresh",
            "-no-color",
            "-lock=false",
            "-target=aws_instance.y",
        ])
    );
    assert_eq!(remote_calls[0].path, Path::new("/repo/proj"));

    assert_eq!(
        h.statuses.calls(),
        vec![
            status(CommitStatus::Pending, url),
            status(CommitStatus::Success, url),
        ]
    );

    let planfile = h
        .fs
        .file("/repo/proj/infra::web-default.tfplan")
        .expect("planfile written");
    assert_eq!(planfile.mode, PLANFILE_MODE);
    let contents = String::from_utf8(planfile.contents).unwrap();
    assert!(contents.starts_with(REMOTE_OPS_HEADER));
    // The stored text is the returned text, diff markers re-indented too.
    assert_eq!(contents, format!("{REMOTE_OPS_HEADER}{output}"));
    assert!(contents.ends_with("\n+ aws_instance.y"));
}

#[tokio::test]
async fn remote_stream_failure_surfaces_partial_output() {
    init_tracing();

    let h = harness(
        "0.12.31",
        FakeTerraformExecutor::new().respond_err(REMOTE_OPS_ERR_0_12),
        FakeAsyncExecutor::new()
            .lines(&["Running plan in the remote backend.", "Waiting for the plan to start..."])
            .fail("exit status 1")
            .line("never consumed"),
        RecordingStatusUpdater::new(),
    );
    let ctx = ContextBuilder::new().build();

    let err = with_timeout(h.runner.plan(&ctx, &[], Path::new("/repo"), &HashMap::new()))
        .await
        .expect_err("remote plan fails");

    match &err {
        PlanError::RemoteExecution { output, source } => {
            assert_eq!(
                output,
                "Running plan in the remote backend.\nWaiting for the plan to start..."
            );
            assert_eq!(source.to_string(), "exit status 1");
        }
        other => panic!("expected RemoteExecution error, got {other:?}"),
    }

    assert_eq!(h.statuses.calls(), vec![status(CommitStatus::Failed, "")]);
    assert!(h.fs.paths().is_empty(), "no planfile on failure");
}

#[tokio::test]
async fn planfile_write_failure_is_fatal() {
    init_tracing();

    let h = harness(
        "1.0.0",
        FakeTerraformExecutor::new().respond_err(REMOTE_OPS_ERR_1_1_0),
        FakeAsyncExecutor::new().lines(&["No changes.", "  ~ nothing"]),
        RecordingStatusUpdater::new(),
    );
    h.fs.fail_writes(true);
    let ctx = ContextBuilder::new().build();

    let err = h
        .runner
        .plan(&ctx, &[], Path::new("/repo"), &HashMap::new())
        .await
        .expect_err("persistence failure is surfaced");

    assert!(matches!(err, PlanError::Persistence { .. }));
    assert!(err.to_string().starts_with("unable to create planfile for remote ops"));
    assert_eq!(err.output(), "No changes.\n~ nothing");
    // The plan itself succeeded.
    assert_eq!(h.statuses.calls(), vec![status(CommitStatus::Success, "")]);
}

#[tokio::test]
async fn status_update_failures_do_not_change_the_outcome() {
    init_tracing();

    let url = "https://app.terraform.io/app/org/ws/runs/run-1";
    let h = harness(
        "1.0.0",
        FakeTerraformExecutor::new().respond_err(REMOTE_OPS_ERR_1_1_0),
        FakeAsyncExecutor::new().lines(&[LINE_BEFORE_RUN_URL, url, "  + a"]),
        RecordingStatusUpdater::failing(),
    );
    let ctx = ContextBuilder::new().build();

    let output = h
        .runner
        .run(&ctx, &[], Path::new("/repo"), &HashMap::new())
        .await
        .expect("plan succeeds despite status errors");

    assert_eq!(output, format!("{LINE_BEFORE_RUN_URL}\n{url}\n+ a"));
    assert_eq!(
        h.statuses.calls(),
        vec![
            status(CommitStatus::Pending, url),
            status(CommitStatus::Success, url),
        ]
    );
}
