//! Shared types used across the relay core.

/// Direction of message flow across a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Telegram to Discord only.
    TelegramToDiscord,
    /// Discord to Telegram only.
    DiscordToTelegram,
    /// Bidirectional.
    Both,
}

impl Direction {
    /// Parse direction from a config string. Unknown values default to `Both`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "telegram_to_discord" => Direction::TelegramToDiscord,
            "discord_to_telegram" => Direction::DiscordToTelegram,
            "both" => Direction::Both,
            _ => Direction::Both,
        }
    }

    /// Check if this direction allows Telegram -> Discord messages.
    pub fn allows_telegram_to_discord(&self) -> bool {
        matches!(self, Direction::TelegramToDiscord | Direction::Both)
    }

    /// Check if this direction allows Discord -> Telegram messages.
    pub fn allows_discord_to_telegram(&self) -> bool {
        matches!(self, Direction::DiscordToTelegram | Direction::Both)
    }

    /// Stable token used in correlation store keys.
    pub fn token(&self) -> &'static str {
        match self {
            Direction::TelegramToDiscord => "t2d",
            Direction::DiscordToTelegram => "d2t",
            Direction::Both => "both",
        }
    }
}

/// Identity of a message sender, platform-neutral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    /// Name shown to users on the destination side.
    pub display_name: String,
    /// Platform username/handle, when the platform has one.
    pub username: Option<String>,
    /// Platform-specific user id.
    pub user_id: i64,
}

impl SenderIdentity {
    pub fn new(display_name: impl Into<String>, user_id: i64) -> Self {
        Self {
            display_name: display_name.into(),
            username: None,
            user_id,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
