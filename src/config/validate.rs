// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, TerraformConfig};
use crate::errors::{PlanstepError, Result};
use crate::version::ToolVersion;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PlanstepError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let binary = validate_binary(&raw.terraform.binary)?;
        let default_version = validate_default_version(&raw.terraform.default_version)?;
        validate_env(&raw)?;

        Ok(ConfigFile {
            terraform: TerraformConfig {
                binary,
                default_version,
            },
            env: raw.env,
        })
    }
}

fn validate_binary(binary: &str) -> Result<String> {
    let binary = binary.trim();
    if binary.is_empty() {
        return Err(PlanstepError::ConfigError(
            "[terraform].binary must not be empty".to_string(),
        ));
    }
    Ok(binary.to_string())
}

fn validate_default_version(raw: &str) -> Result<ToolVersion> {
    raw.parse::<ToolVersion>().map_err(|e| {
        PlanstepError::ConfigError(format!("[terraform].default_version is invalid: {e}"))
    })
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.env.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(PlanstepError::ConfigError(format!(
                "[env] has invalid variable name {key:?}"
            )));
        }
    }
    Ok(())
}
