// src/plan/output.rs

//! Turning raw `terraform plan` output into something that renders as a diff.
//!
//! Two stages, always in this order:
//! 1. drop the "Refreshing state..." preamble (how depends on the version),
//! 2. pull `+`, `~` and `-` markers indented by exactly two spaces back to
//!    column 0 so diff highlighting picks them up.

use std::sync::LazyLock;

use regex::Regex;

use crate::policy::{refresh_strip_mode, RefreshStrip};
use crate::version::ToolVersion;

pub const REFRESH_KEYWORD: &str = "Refreshing state...";

/// Separator terraform < 0.14 prints between the refresh preamble and the plan.
pub const REFRESH_SEPARATOR: &str =
    "------------------------------------------------------------------------\n";

static DIFF_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {2}([+~-])").expect("valid diff marker regex"));

/// Remove the refresh preamble.
///
/// For >= 0.14 everything up to and including the *last* line containing
/// [`REFRESH_KEYWORD`] is dropped. A keyword found only on the very first
/// line is treated the same as no keyword at all and leaves the output
/// untouched.
pub fn strip_refreshing(output: &str, version: &ToolVersion) -> String {
    match refresh_strip_mode(version) {
        RefreshStrip::LastKeywordTruncate => {
            let lines: Vec<&str> = output.split('\n').collect();
            let final_index = lines
                .iter()
                .rposition(|line| line.contains(REFRESH_KEYWORD))
                .unwrap_or(0);

            if final_index == 0 {
                output.to_string()
            } else {
                lines[final_index + 1..].join("\n")
            }
        }
        RefreshStrip::SeparatorTruncate => match output.find(REFRESH_SEPARATOR) {
            Some(idx) => output[idx + REFRESH_SEPARATOR.len()..].to_string(),
            None => output.to_string(),
        },
    }
}

/// `"  - aws_security_group_rule.allow_all"` -> `"- aws_security_group_rule.allow_all"`.
///
/// Only exactly two leading spaces are touched.
pub fn reindent_diff(output: &str) -> String {
    DIFF_MARKER.replace_all(output, "${1}").into_owned()
}

/// Both normalisation stages.
pub fn format_plan_output(output: &str, version: &ToolVersion) -> String {
    reindent_diff(&strip_refreshing(output, version))
}
