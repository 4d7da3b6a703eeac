//! Configuration loading and validation.

pub mod types;
pub mod validate;

use std::path::Path;

use thiserror::Error;

pub use types::{BridgeConfig, Config, DiscordConfig, RelaySettings, TelegramConfig};

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Load and validate configuration from a toml file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    let config: Config = toml::from_str(&raw)?;
    validate::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str(
            r#"
            [[bridges]]
            name = "general"
            telegram_chat_id = -1001
            discord_channel_id = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.bridges.len(), 1);
        assert_eq!(config.bridges[0].name, "general");
        assert!(config.bridges[0].send_usernames);
        assert!(!config.bridges[0].relay_commands);
        assert!(!config.bridges[0].cross_delete_on_discord);
        assert_eq!(config.discord.max_message_length, 2000);
        assert_eq!(config.relay.unroutable_cooldown_secs, 60);
    }

    #[test]
    fn test_parse_full_bridge() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            relay_sticker_emoji = true

            [discord]
            max_message_length = 1500
            max_reply_chars = 80
            max_reply_lines = 2

            [[bridges]]
            name = "ops"
            direction = "telegram_to_discord"
            telegram_chat_id = -1002
            discord_channel_id = 7
            relay_commands = true
            send_usernames = false
            cross_delete_on_discord = true
            "#,
        )
        .unwrap();

        assert!(config.telegram.relay_sticker_emoji);
        assert_eq!(config.discord.max_message_length, 1500);
        let bridge = &config.bridges[0];
        assert_eq!(bridge.direction.as_deref(), Some("telegram_to_discord"));
        assert!(bridge.relay_commands);
        assert!(!bridge.send_usernames);
        assert!(bridge.cross_delete_on_discord);
    }
}
