#![allow(dead_code)]

use std::sync::Arc;

use planstep::fs::mock::MockFileSystem;
use planstep::plan::PlanStepRunner;
use planstep::version::ToolVersion;
use planstep_test_utils::fakes::{FakeAsyncExecutor, FakeTerraformExecutor, RecordingStatusUpdater};

pub use planstep_test_utils::builders::{args, ContextBuilder};
pub use planstep_test_utils::{init_tracing, with_timeout};

/// Everything a plan runner test needs to poke at afterwards.
pub struct Harness {
    pub executor: FakeTerraformExecutor,
    pub async_executor: FakeAsyncExecutor,
    pub statuses: RecordingStatusUpdater,
    pub fs: MockFileSystem,
    pub runner: PlanStepRunner,
}

pub fn harness(
    default_version: &str,
    executor: FakeTerraformExecutor,
    async_executor: FakeAsyncExecutor,
    statuses: RecordingStatusUpdater,
) -> Harness {
    let fs = MockFileSystem::new();
    let runner = PlanStepRunner::new(
        Arc::new(executor.clone()),
        default_version.parse::<ToolVersion>().expect("valid version"),
        Arc::new(statuses.clone()),
        Arc::new(async_executor.clone()),
    )
    .with_filesystem(Arc::new(fs.clone()));

    Harness {
        executor,
        async_executor,
        statuses,
        fs,
        runner,
    }
}
