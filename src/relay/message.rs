//! The platform-neutral enriched message representation.
//!
//! A `CrossMessage` is built once per inbound update by the enrichment
//! pipeline, is immutable afterwards, and is discarded after rendering.

use crate::common::SenderIdentity;
use crate::relay::raw::RawEntity;

/// Kind of a rich-text annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Bold,
    Italic,
    Code,
    Pre,
    Spoiler,
    TextLink,
    Mention,
}

/// One annotation span over the raw text. Offsets count Unicode scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    /// Target URL for `TextLink` spans.
    pub url: Option<String>,
}

impl EntitySpan {
    /// Convert a raw entity; unknown kinds are dropped.
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        let kind = match raw.kind.as_str() {
            "bold" => EntityKind::Bold,
            "italic" => EntityKind::Italic,
            "code" => EntityKind::Code,
            "pre" => EntityKind::Pre,
            "spoiler" => EntityKind::Spoiler,
            "text_link" => EntityKind::TextLink,
            "mention" => EntityKind::Mention,
            _ => return None,
        };
        Some(Self {
            kind,
            offset: raw.offset,
            length: raw.length,
            url: raw.url.clone(),
        })
    }
}

/// Kind of an attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Document,
    Photo,
    Sticker,
    Video,
    Voice,
}

/// Canonical descriptor of the message's single attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub kind: FileKind,
    pub file_id: String,
    pub name: String,
    /// Direct content URL, filled in by the link-resolution stage.
    pub link: Option<String>,
}

/// The message this one replies to.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyRef {
    /// Resolved original sender.
    pub sender: SenderIdentity,
    /// Quoted text with any relay header already stripped.
    pub text: String,
    /// Annotation spans, rewritten when a relay header was stripped.
    pub entities: Vec<EntitySpan>,
    /// The quoted message was produced by this relay itself.
    pub is_own_relay: bool,
    /// Username recovered from the relay header, when `is_own_relay`.
    pub original_username: Option<String>,
}

/// The enriched, platform-neutral view of one inbound message.
#[derive(Debug, Clone)]
pub struct CrossMessage {
    /// Source message id.
    pub source_id: i64,
    /// Source chat id.
    pub chat_id: i64,
    /// Sender identity.
    pub sender: SenderIdentity,
    /// Raw text (or caption, or synthesized value).
    pub text: String,
    /// Annotation spans over `text`.
    pub entities: Vec<EntitySpan>,
    /// Attached file, if any.
    pub file: Option<FileRef>,
    /// Reply lineage, if any.
    pub reply_to: Option<ReplyRef>,
    /// Forward lineage: the original sender, if forwarded.
    pub forward_from: Option<SenderIdentity>,
}

impl CrossMessage {
    /// Start an empty representation for the given source message.
    pub fn new(source_id: i64, chat_id: i64) -> Self {
        Self {
            source_id,
            chat_id,
            sender: SenderIdentity::new("", 0),
            text: String::new(),
            entities: Vec::new(),
            file: None,
            reply_to: None,
            forward_from: None,
        }
    }
}
