//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

use crate::common::error::ConfigError;

pub use parser::load_config;
pub use types::*;

/// Load a config file, apply environment overrides, then validate.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);
    validate::validate_config(&config)?;
    Ok(config)
}

/// Defaults plus environment overrides, for running without a config file.
pub fn defaults_with_env() -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(Config::default());
    validate::validate_config(&config)?;
    Ok(config)
}
