// src/exec/mod.rs

//! Terraform execution layer.
//!
//! - [`backend`] defines the collaborator traits the plan step depends on
//!   (`TerraformExec`, `AsyncTerraformExec`, `StatusUpdater`) and the values
//!   flowing through them.
//! - [`command`] is the production executor built on `tokio::process`.
//! - [`status`] has a status updater that only logs.

pub mod backend;
pub mod command;
pub mod status;

pub use backend::{
    AsyncTerraformExec, BoxFuture, ExecOutcome, RemoteRun, StatusUpdater, StreamEvent,
    TerraformExec,
};
pub use command::{strip_ansi, RealTerraformExecutor};
pub use status::LoggingStatusUpdater;
