// src/config/mod.rs

//! Configuration for the `planstep` binary.
//!
//! - `model.rs`: the TOML data model.
//! - `loader.rs`: reading config files from disk.
//! - `validate.rs`: turning a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, RawConfigFile, TerraformConfig, TerraformSection};
