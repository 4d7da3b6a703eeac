//! Abstract platform capabilities the relay core depends on.
//!
//! The actual SDK clients (connection handling, rate limiting, wire formats)
//! live outside this crate; the core only consumes these narrow contracts.

use async_trait::async_trait;

use crate::common::{FileLinkError, SendError};

/// An attachment ready for delivery: a display name plus the resolved
/// content link the destination can fetch bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// Source-platform (Telegram) capabilities.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Resolve a file id to a direct content URL.
    async fn resolve_file_link(&self, file_id: &str) -> Result<String, FileLinkError>;

    /// Delete a message on the source side.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> anyhow::Result<()>;

    /// Post a transient notice replying to a message. Returns the notice's id.
    async fn reply(&self, chat_id: i64, reply_to: i64, text: &str) -> anyhow::Result<i64>;
}

/// Destination-platform (Discord) capabilities.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Send a message, optionally with an attachment. Returns the new message id.
    async fn send(
        &self,
        channel_id: u64,
        text: &str,
        attachment: Option<&Attachment>,
    ) -> Result<u64, SendError>;

    /// Edit a previously sent message in place.
    async fn edit_message(&self, channel_id: u64, message_id: u64, text: &str)
        -> anyhow::Result<()>;

    /// Delete a batch of messages.
    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> anyhow::Result<()>;

    /// Find a channel member whose display name matches exactly.
    async fn find_member_by_display_name(
        &self,
        channel_id: u64,
        name: &str,
    ) -> anyhow::Result<Option<u64>>;
}
