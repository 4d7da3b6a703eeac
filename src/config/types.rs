//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub bridges: Vec<BridgeConfig>,
}

/// Telegram-side settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Relay a sticker's emoji as the message text.
    #[serde(default)]
    pub relay_sticker_emoji: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            relay_sticker_emoji: false,
        }
    }
}

/// Discord-side settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Per-message length limit on the destination.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Character budget for rendered reply quotes.
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
    /// Line budget for rendered reply quotes.
    #[serde(default = "default_max_reply_lines")]
    pub max_reply_lines: usize,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
            max_reply_chars: default_max_reply_chars(),
            max_reply_lines: default_max_reply_lines(),
        }
    }
}

/// Relay-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Cool-down in seconds for the repeated "no bridge configured" notice.
    #[serde(default = "default_unroutable_cooldown_secs")]
    pub unroutable_cooldown_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            unroutable_cooldown_secs: default_unroutable_cooldown_secs(),
        }
    }
}

/// One configured Telegram chat <-> Discord channel link.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Unique bridge name, used in logs and correlation keys.
    pub name: String,
    /// Direction: "both", "telegram_to_discord", "discord_to_telegram".
    pub direction: Option<String>,
    /// Telegram chat id.
    pub telegram_chat_id: i64,
    /// Discord channel id.
    pub discord_channel_id: u64,
    /// Relay bot commands (messages starting with '/').
    #[serde(default)]
    pub relay_commands: bool,
    /// Relay member join notices.
    #[serde(default = "default_true")]
    pub relay_join_messages: bool,
    /// Relay member leave notices.
    #[serde(default = "default_true")]
    pub relay_leave_messages: bool,
    /// Prefix relayed messages with the sender's name.
    #[serde(default = "default_true")]
    pub send_usernames: bool,
    /// Delete the Discord side when a Telegram message is edited to the sentinel.
    #[serde(default)]
    pub cross_delete_on_discord: bool,
}

fn default_max_message_length() -> usize {
    2000
}

fn default_max_reply_chars() -> usize {
    100
}

fn default_max_reply_lines() -> usize {
    1
}

fn default_unroutable_cooldown_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}
