//! Configuration validation.
//!
//! Collects every problem into a single error so they can be fixed in one pass.

use crate::commands::COMMAND_TRIGGER;
use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.chat.max_length == 0 {
        errors.push("chat.max_length must be non-zero".to_string());
    }

    if config.storage.chat_log.trim().is_empty() {
        errors.push("storage.chat_log is required".to_string());
    }

    if config.bridge.enabled {
        if config.bridge.primary_channel.is_empty() {
            errors.push("bridge.primary_channel is required when the bridge is enabled".to_string());
        }
        if config.bridge.secondary_channel.is_empty() {
            errors.push(
                "bridge.secondary_channel is required when the bridge is enabled".to_string(),
            );
        }
    }
    for (i, command) in config.bridge.external_commands.iter().enumerate() {
        if !command.starts_with(COMMAND_TRIGGER) {
            errors.push(format!(
                "bridge.external_commands[{}] '{}' does not start with '{}'",
                i, command, COMMAND_TRIGGER
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
