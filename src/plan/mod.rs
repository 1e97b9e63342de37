// src/plan/mod.rs

//! The terraform plan step.
//!
//! - [`command`] builds the `terraform plan` argument lists.
//! - [`output`] normalises plan output for display.
//! - [`remote_ops`] recognises the "remote backend can't save plans" failure.
//! - [`stream`] consumes a streaming remote plan and drives commit statuses.
//! - [`planfile`] names and writes planfiles.
//! - [`runner`] sequences all of the above ([`PlanStepRunner`]).
//! - [`workspace`] selects the terraform workspace before a step runs.

pub mod command;
pub mod output;
pub mod planfile;
pub mod remote_ops;
pub mod runner;
pub mod stream;
pub mod workspace;

pub use output::{format_plan_output, reindent_diff, strip_refreshing};
pub use planfile::{plan_filename, REMOTE_OPS_HEADER};
pub use runner::{PlanStepRunner, StepRunner};
pub use stream::{consume_remote_stream, StreamOutcome, LINE_BEFORE_RUN_URL};
pub use workspace::WorkspaceStepRunner;
