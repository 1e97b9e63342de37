// src/policy.rs

//! Version-gated answers used by the plan step, plus the fixed error text
//! terraform prints when a remote backend refuses `-out`.
//!
//! Everything here is pure: no I/O, no logging.

use crate::version::{TF_0_9, TF_0_10, TF_0_12, TF_0_14, ToolVersion};

/// How the "Refreshing state..." preamble is removed from plan output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStrip {
    /// Drop everything up to and including the last line containing the
    /// refresh keyword (terraform >= 0.14).
    LastKeywordTruncate,
    /// Drop everything up to and including the first separator line
    /// (terraform < 0.14).
    SeparatorTruncate,
}

/// Error printed by terraform 0.11.14 when the "remote" backend can't save a
/// plan locally.
pub const REMOTE_OPS_ERR_0_11_14: &str = "Error: Saving a generated plan is currently not supported!

The \"remote\" backend does not support saving the generated execution
plan locally at this time.

";

/// Same error for terraform 0.12.x.
pub const REMOTE_OPS_ERR_0_12: &str = "Error: Saving a generated plan is currently not supported

The \"remote\" backend does not support saving the generated execution plan
locally at this time.

";

/// Same error for terraform 1.0.x.
pub const REMOTE_OPS_ERR_1_0_0: &str = "Error: Saving a generated plan is currently not supported

The \"remote\" backend does not support saving the generated execution plan
locally at this time.
";

/// Terraform Cloud wording used from terraform 1.1.0 on.
pub const REMOTE_OPS_ERR_1_1_0: &str = "╷
│ Error: Saving a generated plan is currently not supported
│
│ Terraform Cloud does not support saving the generated execution plan
│ locally at this time.
╵
";

const REMOTE_OPS_SIGNATURES: [&str; 4] = [
    REMOTE_OPS_ERR_1_1_0,
    REMOTE_OPS_ERR_0_11_14,
    REMOTE_OPS_ERR_0_12,
    REMOTE_OPS_ERR_1_0_0,
];

/// Terraform < 0.12 accepts `-var` for undeclared variables, so we can pass
/// who/what triggered the plan. Later versions reject them.
pub fn should_inject_legacy_vars(v: &ToolVersion) -> bool {
    *v < TF_0_12
}

pub fn refresh_strip_mode(v: &ToolVersion) -> RefreshStrip {
    if *v >= TF_0_14 {
        RefreshStrip::LastKeywordTruncate
    } else {
        RefreshStrip::SeparatorTruncate
    }
}

/// True if `output` contains any of the known "remote backend can't save a
/// plan" errors verbatim.
pub fn is_remote_ops_failure_signature(output: &str) -> bool {
    REMOTE_OPS_SIGNATURES
        .iter()
        .any(|signature| output.contains(signature))
}

pub fn supports_workspaces(v: &ToolVersion) -> bool {
    *v >= TF_0_9
}

/// 0.9.x called workspaces "environments".
pub fn workspace_subcommand(v: &ToolVersion) -> &'static str {
    if *v < TF_0_10 { "env" } else { "workspace" }
}

/// `workspace show` only exists from 0.10 on.
pub fn can_show_workspace(v: &ToolVersion) -> bool {
    *v >= TF_0_10
}
