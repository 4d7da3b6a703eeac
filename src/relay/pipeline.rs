//! Context enrichment pipeline.
//!
//! An explicit ordered list of stages turns one raw inbound message into a
//! `CrossMessage`. Each stage transforms the accumulating record and
//! reports `Flow::Continue` or `Flow::Skip`; early exit is a value, not a
//! callback. Stage order matters only where documented: sender identity is
//! extracted before reply/forward lineage, text before quote construction.

use tracing::{debug, warn};

use crate::common::{FileLinkError, RelayResult, SenderIdentity};
use crate::platform::TelegramApi;
use crate::relay::message::{CrossMessage, EntitySpan, FileKind, FileRef, ReplyRef};
use crate::relay::raw::RawMessage;

/// Placeholder for a quoted message with no text.
pub const EMPTY_QUOTE_PLACEHOLDER: &str = "[no text]";

/// Outcome of one enrichment stage.
pub enum Flow {
    Continue,
    Skip(&'static str),
}

/// Inputs shared by all stages.
pub struct EnrichOptions {
    /// The relay's own Telegram user id; used to recognize replies to
    /// messages this relay posted.
    pub bot_user_id: i64,
    /// Relay a sticker's emoji as the message text.
    pub relay_sticker_emoji: bool,
}

type Stage = fn(&mut CrossMessage, &RawMessage, &EnrichOptions) -> Flow;

/// The ordered stage list. Reordering entries here is safe except for the
/// dependencies noted in the module docs.
const STAGES: &[(&str, Stage)] = &[
    ("sender", extract_sender),
    ("reply", extract_reply),
    ("forward", extract_forward),
    ("text", extract_text),
    ("file", extract_file),
];

/// Run the enrichment pipeline over one selected message.
///
/// Returns `None` when a stage short-circuits; the update is not relayable.
pub async fn enrich(
    raw: &RawMessage,
    options: &EnrichOptions,
    telegram: &dyn TelegramApi,
) -> RelayResult<Option<CrossMessage>> {
    let mut msg = CrossMessage::new(raw.message_id, raw.chat.id);

    for (name, stage) in STAGES {
        match stage(&mut msg, raw, options) {
            Flow::Continue => {}
            Flow::Skip(reason) => {
                debug!(stage = name, reason, message_id = raw.message_id, "enrichment stopped");
                return Ok(None);
            }
        }
    }

    resolve_file_link(&mut msg, telegram).await?;

    Ok(Some(msg))
}

/// Stage: sender identity.
fn extract_sender(msg: &mut CrossMessage, raw: &RawMessage, _options: &EnrichOptions) -> Flow {
    if let Some(from) = &raw.from {
        let mut identity = SenderIdentity::new(from.display_name(), from.id);
        if let Some(username) = &from.username {
            identity = identity.with_username(username.clone());
        }
        msg.sender = identity;
        return Flow::Continue;
    }

    // Channel posts carry no user; the channel itself is the sender.
    if let Some(title) = &raw.chat.title {
        msg.sender = SenderIdentity::new(title.clone(), raw.chat.id);
        return Flow::Continue;
    }

    Flow::Skip("no sender and no chat title")
}

/// Stage: reply lineage.
///
/// When the quoted message is one of our own relays, its first line is the
/// display-name header the renderer added on the way out. Strip it and
/// rewrite entity offsets by the removed length plus the line break.
fn extract_reply(msg: &mut CrossMessage, raw: &RawMessage, options: &EnrichOptions) -> Flow {
    let Some(quoted) = &raw.reply_to_message else {
        return Flow::Continue;
    };

    let text = quoted
        .text
        .clone()
        .or_else(|| quoted.caption.clone())
        .unwrap_or_default();
    let raw_entities = if quoted.text.is_some() {
        &quoted.entities
    } else {
        &quoted.caption_entities
    };
    let mut entities: Vec<EntitySpan> =
        raw_entities.iter().filter_map(EntitySpan::from_raw).collect();

    let sender = match &quoted.from {
        Some(from) => {
            let mut identity = SenderIdentity::new(from.display_name(), from.id);
            if let Some(username) = &from.username {
                identity = identity.with_username(username.clone());
            }
            identity
        }
        None => SenderIdentity::new(
            quoted.chat.title.clone().unwrap_or_default(),
            quoted.chat.id,
        ),
    };

    let is_own_relay = quoted.from.as_ref().map(|u| u.id) == Some(options.bot_user_id);

    let (mut text, original_username) = if is_own_relay {
        let (username, stripped) = strip_relay_header(&text);
        let removed = username.chars().count() + 1;
        entities.retain(|span| span.offset >= removed);
        for span in &mut entities {
            span.offset -= removed;
        }
        (stripped, Some(username))
    } else {
        (text, None)
    };

    if text.is_empty() {
        text = EMPTY_QUOTE_PLACEHOLDER.to_string();
        entities.clear();
    }

    msg.reply_to = Some(ReplyRef {
        sender,
        text,
        entities,
        is_own_relay,
        original_username,
    });
    Flow::Continue
}

/// Split a relayed message into its header line (the original username) and
/// the remaining body. The offset rewrite in `extract_reply` depends on the
/// username being exactly the first line.
fn strip_relay_header(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((header, body)) => (header.to_string(), body.to_string()),
        None => (text.to_string(), String::new()),
    }
}

/// Stage: forward lineage. Forwarded-from-user wins over forwarded-from-channel.
fn extract_forward(msg: &mut CrossMessage, raw: &RawMessage, _options: &EnrichOptions) -> Flow {
    if let Some(user) = &raw.forward_from {
        let mut identity = SenderIdentity::new(user.display_name(), user.id);
        if let Some(username) = &user.username {
            identity = identity.with_username(username.clone());
        }
        msg.forward_from = Some(identity);
    } else if let Some(chat) = &raw.forward_from_chat {
        msg.forward_from = Some(SenderIdentity::new(
            chat.title.clone().unwrap_or_default(),
            chat.id,
        ));
    }
    Flow::Continue
}

/// Stage: raw text. Exactly one source wins, in priority order:
/// text > caption > sticker emoji (config-gated) > location URL > empty.
fn extract_text(msg: &mut CrossMessage, raw: &RawMessage, options: &EnrichOptions) -> Flow {
    if let Some(text) = &raw.text {
        msg.text = text.clone();
        msg.entities = raw.entities.iter().filter_map(EntitySpan::from_raw).collect();
    } else if let Some(caption) = &raw.caption {
        msg.text = caption.clone();
        msg.entities = raw
            .caption_entities
            .iter()
            .filter_map(EntitySpan::from_raw)
            .collect();
    } else if let Some(sticker) = &raw.sticker {
        if options.relay_sticker_emoji {
            msg.text = sticker.emoji.clone().unwrap_or_default();
        }
    } else if let Some(location) = &raw.location {
        msg.text = format!(
            "https://maps.google.com/?q={},{}",
            location.latitude, location.longitude
        );
    }
    Flow::Continue
}

/// Stage: file descriptor. Exactly one of audio/document/photo/sticker/
/// video/voice is selected, in that priority order.
fn extract_file(msg: &mut CrossMessage, raw: &RawMessage, _options: &EnrichOptions) -> Flow {
    msg.file = if let Some(audio) = &raw.audio {
        Some(FileRef {
            kind: FileKind::Audio,
            file_id: audio.file_id.clone(),
            name: media_name(audio.file_name.as_deref(), audio.mime_type.as_deref()),
            link: None,
        })
    } else if let Some(document) = &raw.document {
        Some(FileRef {
            kind: FileKind::Document,
            file_id: document.file_id.clone(),
            name: media_name(document.file_name.as_deref(), document.mime_type.as_deref()),
            link: None,
        })
    } else if let Some(largest) = raw
        .photo
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
    {
        Some(FileRef {
            kind: FileKind::Photo,
            file_id: largest.file_id.clone(),
            name: "photo.jpg".to_string(),
            link: None,
        })
    } else if let Some(sticker) = &raw.sticker {
        // Animated stickers cannot be displayed on the destination;
        // substitute the static thumbnail.
        let (file_id, name) = if sticker.is_animated {
            match &sticker.thumb {
                Some(thumb) => (thumb.file_id.clone(), "sticker.png".to_string()),
                None => (sticker.file_id.clone(), "sticker.webp".to_string()),
            }
        } else {
            (sticker.file_id.clone(), "sticker.webp".to_string())
        };
        Some(FileRef {
            kind: FileKind::Sticker,
            file_id,
            name,
            link: None,
        })
    } else if let Some(video) = &raw.video {
        Some(FileRef {
            kind: FileKind::Video,
            file_id: video.file_id.clone(),
            name: media_name(video.file_name.as_deref(), video.mime_type.as_deref()),
            link: None,
        })
    } else if let Some(voice) = &raw.voice {
        Some(FileRef {
            kind: FileKind::Voice,
            file_id: voice.file_id.clone(),
            name: media_name(voice.file_name.as_deref(), voice.mime_type.as_deref()),
            link: None,
        })
    } else {
        None
    };
    Flow::Continue
}

/// Synthesize a file name from the MIME type when the source provides none.
fn media_name(file_name: Option<&str>, mime_type: Option<&str>) -> String {
    if let Some(name) = file_name {
        return name.to_string();
    }
    match mime_type.and_then(|m| m.split('/').nth(1)) {
        Some(subtype) => format!("file.{subtype}"),
        None => "file".to_string(),
    }
}

/// Final stage: resolve the file's direct content link.
///
/// An oversized file drops the attachment and notifies the source chat;
/// the rest of the message still relays.
async fn resolve_file_link(
    msg: &mut CrossMessage,
    telegram: &dyn TelegramApi,
) -> RelayResult<()> {
    let Some(file) = &mut msg.file else {
        return Ok(());
    };

    match telegram.resolve_file_link(&file.file_id).await {
        Ok(url) => {
            file.link = Some(url);
        }
        Err(FileLinkError::TooLarge) => {
            warn!(
                chat_id = msg.chat_id,
                message_id = msg.source_id,
                "attachment too large to relay, skipping"
            );
            msg.file = None;
            if let Err(e) = telegram
                .reply(
                    msg.chat_id,
                    msg.source_id,
                    "File is too large to relay; sending the message without it.",
                )
                .await
            {
                warn!("failed to post oversized-file notice: {e}");
            }
        }
        Err(e) => {
            warn!(
                chat_id = msg.chat_id,
                message_id = msg.source_id,
                "file link resolution failed, dropping attachment: {e}"
            );
            msg.file = None;
        }
    }
    Ok(())
}
