// src/plan/remote_ops.rs

use crate::exec::ExecOutcome;
use crate::policy::is_remote_ops_failure_signature;

/// True if the invocation failed *because* the project uses a remote-ops
/// backend that can't save a plan locally. Successful runs never qualify,
/// whatever their output says.
pub fn is_remote_ops_error(outcome: &ExecOutcome) -> bool {
    outcome.error.is_some() && is_remote_ops_failure_signature(&outcome.output)
}
