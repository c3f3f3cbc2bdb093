//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `LOBBYKEEPER_CHAT_LOG` - chat log path
//! - `LOBBYKEEPER_MAX_CHAT_LENGTH` - maximum message length
//! - `LOBBYKEEPER_SERVER_NAME` - display name for server announcements
//! - `LOBBYKEEPER_BRIDGE_ENABLED` - `true`/`false`, `1`/`0`

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "LOBBYKEEPER";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides from an arbitrary key lookup.
pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));

    if let Some(path) = var("CHAT_LOG") {
        config.storage.chat_log = path;
    }

    if let Some(length) = var("MAX_CHAT_LENGTH") {
        match length.parse() {
            Ok(length) => config.chat.max_length = length,
            Err(_) => warn!("Ignoring {}_MAX_CHAT_LENGTH={:?}: not a number", ENV_PREFIX, length),
        }
    }

    if let Some(name) = var("SERVER_NAME") {
        config.chat.server_name = name;
    }

    if let Some(enabled) = var("BRIDGE_ENABLED") {
        match parse_bool(&enabled) {
            Some(enabled) => config.bridge.enabled = enabled,
            None => warn!("Ignoring {}_BRIDGE_ENABLED={:?}: not a boolean", ENV_PREFIX, enabled),
        }
    }

    config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the config file path from environment or use default.
///
/// Checks `LOBBYKEEPER_CONFIG` environment variable, otherwise returns "lobbykeeper.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "lobbykeeper.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "LOBBYKEEPER");
    }

    #[test]
    fn test_no_overrides() {
        let result = apply_overrides_from(Config::default(), overrides(&[]));
        assert_eq!(result.storage.chat_log, "chat_log.jsonl");
        assert_eq!(result.chat.max_length, 300);
    }

    #[test]
    fn test_overrides_applied() {
        let result = apply_overrides_from(
            Config::default(),
            overrides(&[
                ("LOBBYKEEPER_CHAT_LOG", "/tmp/chat.jsonl"),
                ("LOBBYKEEPER_MAX_CHAT_LENGTH", "80"),
                ("LOBBYKEEPER_SERVER_NAME", "Keeper"),
                ("LOBBYKEEPER_BRIDGE_ENABLED", "yes"),
            ]),
        );
        assert_eq!(result.storage.chat_log, "/tmp/chat.jsonl");
        assert_eq!(result.chat.max_length, 80);
        assert_eq!(result.chat.server_name, "Keeper");
        assert!(result.bridge.enabled);
    }

    #[test]
    fn test_malformed_values_ignored() {
        let result = apply_overrides_from(
            Config::default(),
            overrides(&[
                ("LOBBYKEEPER_MAX_CHAT_LENGTH", "lots"),
                ("LOBBYKEEPER_BRIDGE_ENABLED", "maybe"),
            ]),
        );
        assert_eq!(result.chat.max_length, 300);
        assert!(!result.bridge.enabled);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
