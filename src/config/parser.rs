//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[cfg(test)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate::validate_config;

    #[test]
    fn test_parse_full_config() {
        let config = load_config_str(
            r#"
            chat {
                max_length = 120
                server_name = "Lobbykeeper"
            }
            storage {
                chat_log = "/var/lib/lobbykeeper/chat.jsonl"
            }
            bridge {
                enabled = true
                primary_channel = "lobby"
                secondary_channel = "notices"
                external_commands = ["/link", "/status"]
            }
            commands {
                here_cooldown_secs = 60
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.chat.max_length, 120);
        assert_eq!(config.chat.server_name, "Lobbykeeper");
        assert_eq!(config.storage.chat_log, "/var/lib/lobbykeeper/chat.jsonl");
        assert!(config.bridge.enabled);
        assert_eq!(config.bridge.external_commands, vec!["/link", "/status"]);
        assert_eq!(config.commands.here_cooldown_secs, 60);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = load_config_str("chat { max_length = 50 }").unwrap();
        assert_eq!(config.chat.max_length, 50);
        assert_eq!(config.chat.server_name, "");
        assert_eq!(config.bridge.primary_channel, "general");
        assert_eq!(config.commands.here_cooldown_secs, 1200);
    }

    #[test]
    fn test_trigger_key_is_not_a_setting() {
        let config = load_config_str(r#"chat { trigger = "!", max_length = 40 }"#).unwrap();
        assert_eq!(config.chat.max_length, 40);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/lobbykeeper.conf");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
