//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
///
/// Every section is optional in the file; missing keys take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub storage: StorageConfig,
    pub bridge: BridgeConfig,
    pub commands: CommandsConfig,
}

/// Chat pipeline settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum message length in characters.
    pub max_length: usize,
    /// Display name for server announcements.
    pub server_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_length: 300,
            server_name: String::new(),
        }
    }
}

/// Chat log location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub chat_log: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chat_log: "chat_log.jsonl".to_string(),
        }
    }
}

/// External chat bridge settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enabled: bool,
    /// Channel that mirrors the lobby.
    pub primary_channel: String,
    /// Channel for server notices.
    pub secondary_channel: String,
    /// Commands handled by the bridge itself.
    pub external_commands: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            primary_channel: "general".to_string(),
            secondary_channel: "bot".to_string(),
            external_commands: vec!["/link".to_string(), "/unlink".to_string()],
        }
    }
}

/// Command tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Seconds between two `/here` alerts.
    pub here_cooldown_secs: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            here_cooldown_secs: 20 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chat.max_length, 300);
        assert_eq!(config.storage.chat_log, "chat_log.jsonl");
        assert!(!config.bridge.enabled);
        assert_eq!(config.commands.here_cooldown_secs, 1200);
    }
}
