// src/version.rs

//! Terraform version values.
//!
//! `ToolVersion` is a thin wrapper around [`semver::Version`] so that all the
//! version-gated behaviour in this crate compares against typed thresholds
//! rather than strings. Parsing is a little more forgiving than strict semver
//! because terraform versions show up as `v1.5.7`, `0.12` or `1.6.0-beta1`
//! depending on where they come from.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer};

use crate::errors::PlanstepError;

/// First version with `terraform env` (workspaces).
pub const TF_0_9: ToolVersion = ToolVersion::new(0, 9, 0);
/// `terraform env` was renamed to `terraform workspace`.
pub const TF_0_10: ToolVersion = ToolVersion::new(0, 10, 0);
/// Undeclared `-var` flags became an error.
pub const TF_0_12: ToolVersion = ToolVersion::new(0, 12, 0);
/// Refresh output stopped being followed by a separator line.
pub const TF_0_14: ToolVersion = ToolVersion::new(0, 14, 0);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolVersion(Version);

impl ToolVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        ToolVersion(Version::new(major, minor, patch))
    }
}

impl From<Version> for ToolVersion {
    fn from(v: Version) -> Self {
        ToolVersion(v)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ToolVersion {
    type Err = PlanstepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        let padded = pad_missing_components(trimmed);

        Version::parse(&padded)
            .map(ToolVersion)
            .map_err(|source| PlanstepError::VersionError {
                input: s.to_string(),
                source,
            })
    }
}

impl<'de> Deserialize<'de> for ToolVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// `"0.12"` -> `"0.12.0"`, `"1"` -> `"1.0.0"`. Pre-release and build
/// suffixes are kept on the last numeric component.
fn pad_missing_components(s: &str) -> String {
    let core_end = s.find(['-', '+']).unwrap_or(s.len());
    let (core, suffix) = s.split_at(core_end);
    let missing = 3usize.saturating_sub(core.split('.').count());

    let mut out = core.to_string();
    for _ in 0..missing {
        out.push_str(".0");
    }
    out.push_str(suffix);
    out
}
