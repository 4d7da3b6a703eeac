//! Raw inbound update model.
//!
//! The minimal Telegram-shaped view the enrichment pipeline consumes. The
//! SDK client that produces these lives outside the crate; it hands over
//! decoded updates and nothing else.

use serde::Deserialize;

/// One inbound chat update. At most one of the message fields is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUpdate {
    pub message: Option<RawMessage>,
    pub edited_message: Option<RawMessage>,
    pub channel_post: Option<RawMessage>,
}

/// How the selected message arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    New,
    Edited,
    ChannelPost,
}

impl RawUpdate {
    /// Select the single message view, priority: new > edited > channel post.
    pub fn select(&self) -> Option<(&RawMessage, UpdateKind)> {
        if let Some(msg) = &self.message {
            return Some((msg, UpdateKind::New));
        }
        if let Some(msg) = &self.edited_message {
            return Some((msg, UpdateKind::Edited));
        }
        if let Some(msg) = &self.channel_post {
            return Some((msg, UpdateKind::ChannelPost));
        }
        None
    }
}

/// One Telegram message as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    pub message_id: i64,
    pub chat: RawChat,
    pub from: Option<RawUser>,
    pub text: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub caption_entities: Vec<RawEntity>,
    pub reply_to_message: Option<Box<RawMessage>>,
    pub forward_from: Option<RawUser>,
    pub forward_from_chat: Option<RawChat>,
    pub audio: Option<RawMedia>,
    pub document: Option<RawMedia>,
    #[serde(default)]
    pub photo: Vec<RawPhotoSize>,
    pub sticker: Option<RawSticker>,
    pub video: Option<RawMedia>,
    pub voice: Option<RawMedia>,
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub new_chat_members: Vec<RawUser>,
    pub left_chat_member: Option<RawUser>,
}

/// A Telegram user reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl RawUser {
    /// First name plus last name when present.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// A Telegram chat reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChat {
    pub id: i64,
    pub title: Option<String>,
}

/// A rich-text annotation span. Offsets and lengths count Unicode scalars.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    pub url: Option<String>,
}

/// A generic media descriptor (audio, document, video, voice).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMedia {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// One size variant of a photo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// A sticker descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSticker {
    pub file_id: String,
    pub emoji: Option<String>,
    #[serde(default)]
    pub is_animated: bool,
    pub thumb: Option<RawPhotoSize>,
}

/// A shared location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_priority() {
        let mut update = RawUpdate::default();
        assert!(update.select().is_none());

        update.channel_post = Some(RawMessage {
            message_id: 3,
            ..Default::default()
        });
        assert_eq!(update.select().unwrap().1, UpdateKind::ChannelPost);

        update.edited_message = Some(RawMessage {
            message_id: 2,
            ..Default::default()
        });
        assert_eq!(update.select().unwrap().1, UpdateKind::Edited);

        update.message = Some(RawMessage {
            message_id: 1,
            ..Default::default()
        });
        let (msg, kind) = update.select().unwrap();
        assert_eq!(kind, UpdateKind::New);
        assert_eq!(msg.message_id, 1);
    }

    #[test]
    fn test_display_name() {
        let user = RawUser {
            id: 1,
            first_name: "Alice".to_string(),
            last_name: Some("Smith".to_string()),
            username: None,
        };
        assert_eq!(user.display_name(), "Alice Smith");

        let user = RawUser {
            id: 2,
            first_name: "Bob".to_string(),
            last_name: None,
            username: None,
        };
        assert_eq!(user.display_name(), "Bob");
    }
}
