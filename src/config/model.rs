// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::version::ToolVersion;

/// Config file as read from TOML, before validation.
///
/// ```toml
/// [terraform]
/// binary = "terraform"
/// default_version = "1.5.7"
///
/// [env]
/// TF_IN_AUTOMATION = "true"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub terraform: TerraformSection,

    /// Environment variables passed to every terraform invocation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[terraform]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TerraformSection {
    /// Binary name or path. Resolved through `PATH` by the shell.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Version used when a project doesn't pin one.
    #[serde(default = "default_version")]
    pub default_version: String,
}

fn default_binary() -> String {
    "terraform".to_string()
}

fn default_version() -> String {
    "1.5.7".to_string()
}

impl Default for TerraformSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            default_version: default_version(),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub terraform: TerraformConfig,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TerraformConfig {
    pub binary: String,
    pub default_version: ToolVersion,
}
