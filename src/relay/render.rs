//! Per-bridge message rendering.
//!
//! Turns one `CrossMessage` into a destination-ready payload for each
//! selected bridge: header line, body text with any reply quote prepended,
//! and the attachment carried through unchanged.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::Bridge;
use crate::platform::{Attachment, DiscordApi};
use crate::relay::markup;
use crate::relay::message::CrossMessage;

/// Quote truncation budgets.
#[derive(Debug, Clone, Copy)]
pub struct RenderLimits {
    /// Character budget for the quoted body.
    pub max_reply_chars: usize,
    /// Maximum quoted lines.
    pub max_reply_lines: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_reply_chars: 100,
            max_reply_lines: 1,
        }
    }
}

/// Destination-ready output for one bridge. Exists only for the duration
/// of one relay operation.
#[derive(Debug, Clone)]
pub struct RenderedPayload {
    pub bridge: Arc<Bridge>,
    pub header: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl RenderedPayload {
    /// Header and body concatenated the way the executor sends them.
    pub fn full_text(&self) -> String {
        if self.header.is_empty() {
            self.body.clone()
        } else if self.body.is_empty() {
            self.header.clone()
        } else {
            format!("{}\n{}", self.header, self.body)
        }
    }
}

/// Render one message for one bridge.
pub async fn render(
    msg: &CrossMessage,
    bridge: Arc<Bridge>,
    discord: &dyn DiscordApi,
    limits: RenderLimits,
) -> RenderedPayload {
    let channel_id = bridge.discord_channel_id;

    let replied_name = match &msg.reply_to {
        Some(reply) => Some(resolve_replied_name(reply, discord, channel_id).await),
        None => None,
    };

    let header = compose_header(msg, &bridge, replied_name.as_deref());

    let translated = markup::translate(&msg.text, &msg.entities, discord, channel_id).await;
    let body = match &msg.reply_to {
        Some(reply) => {
            let quoted_source =
                markup::translate(&reply.text, &reply.entities, discord, channel_id).await;
            let quote = render_quote(&quoted_source, limits);
            if translated.is_empty() {
                quote
            } else {
                format!("{quote}\n{translated}")
            }
        }
        None => translated,
    };

    let attachment = msg.file.as_ref().and_then(|file| {
        file.link.as_ref().map(|url| Attachment {
            name: file.name.clone(),
            url: url.clone(),
        })
    });

    RenderedPayload {
        bridge,
        header,
        body,
        attachment,
    }
}

/// Name shown for the message being replied to.
///
/// Replies to our own relays carry the recovered original-platform username;
/// resolve it to a destination-native mention when a member's display name
/// matches, otherwise fall back to the plain string.
async fn resolve_replied_name(
    reply: &crate::relay::message::ReplyRef,
    discord: &dyn DiscordApi,
    channel_id: u64,
) -> String {
    if reply.is_own_relay {
        let username = reply
            .original_username
            .clone()
            .unwrap_or_else(|| reply.sender.display_name.clone());
        match discord
            .find_member_by_display_name(channel_id, &username)
            .await
        {
            Ok(Some(member_id)) => format!("<@{member_id}>"),
            Ok(None) => username,
            Err(e) => {
                debug!("member lookup failed for '{username}': {e}");
                username
            }
        }
    } else {
        reply.sender.display_name.clone()
    }
}

/// Compose the header line. Precedence: forward > reply > plain.
fn compose_header(msg: &CrossMessage, bridge: &Bridge, replied_name: Option<&str>) -> String {
    let sender = &msg.sender.display_name;

    if bridge.send_usernames {
        if let Some(original) = &msg.forward_from {
            format!("**{sender}** (forwarded by {})", original.display_name)
        } else if let Some(replied) = replied_name {
            format!("**{sender}** (in reply to {replied})")
        } else {
            format!("**{sender}**")
        }
    } else if let Some(original) = &msg.forward_from {
        format!("(forward from {})", original.display_name)
    } else if let Some(replied) = replied_name {
        format!("(in reply to {replied})")
    } else {
        String::new()
    }
}

/// Render the quoted body as a blockquote under the configured budgets.
///
/// Truncates to the character budget, then the line budget, appends an
/// ellipsis when anything was cut, and rebalances spoiler delimiters that
/// the cut left open. The rebalance is a property-preserving heuristic,
/// not a markup parser: a closing delimiter is appended only when the
/// source's own delimiter count was even.
fn render_quote(source: &str, limits: RenderLimits) -> String {
    let total_chars = source.chars().count();
    let mut quoted: String = source.chars().take(limits.max_reply_chars).collect();
    let mut truncated = total_chars > limits.max_reply_chars;

    let lines: Vec<&str> = quoted.lines().collect();
    if lines.len() > limits.max_reply_lines {
        quoted = lines[..limits.max_reply_lines].join("\n");
        truncated = true;
    }

    if truncated {
        quoted.push('…');
    }

    if spoiler_count(source) % 2 == 0 && spoiler_count(&quoted) % 2 == 1 {
        quoted.push_str("||");
    }

    quoted
        .lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn spoiler_count(s: &str) -> usize {
    s.matches("||").count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SenderIdentity;
    use crate::config::BridgeConfig;
    use crate::platform::mock::MockDiscord;
    use crate::relay::message::{FileKind, FileRef, ReplyRef};

    fn bridge(send_usernames: bool) -> Arc<Bridge> {
        Arc::new(Bridge::from_config(&BridgeConfig {
            name: "general".to_string(),
            direction: None,
            telegram_chat_id: -1001,
            discord_channel_id: 42,
            relay_commands: false,
            relay_join_messages: true,
            relay_leave_messages: true,
            send_usernames,
            cross_delete_on_discord: false,
        }))
    }

    fn message(text: &str) -> CrossMessage {
        let mut msg = CrossMessage::new(10, -1001);
        msg.sender = SenderIdentity::new("Alice", 1);
        msg.text = text.to_string();
        msg
    }

    fn reply(text: &str, own: bool) -> ReplyRef {
        ReplyRef {
            sender: SenderIdentity::new("Bob", 2),
            text: text.to_string(),
            entities: Vec::new(),
            is_own_relay: own,
            original_username: if own { Some("Bob".to_string()) } else { None },
        }
    }

    #[tokio::test]
    async fn test_plain_header_with_usernames() {
        let discord = MockDiscord::default();
        let payload = render(
            &message("hello"),
            bridge(true),
            &discord,
            RenderLimits::default(),
        )
        .await;
        assert_eq!(payload.header, "**Alice**");
        assert_eq!(payload.body, "hello");
        assert_eq!(payload.full_text(), "**Alice**\nhello");
    }

    #[tokio::test]
    async fn test_plain_header_without_usernames() {
        let discord = MockDiscord::default();
        let payload = render(
            &message("hello"),
            bridge(false),
            &discord,
            RenderLimits::default(),
        )
        .await;
        assert_eq!(payload.header, "");
        assert_eq!(payload.full_text(), "hello");
    }

    #[tokio::test]
    async fn test_forward_beats_reply() {
        let discord = MockDiscord::default();
        let mut msg = message("hi");
        msg.forward_from = Some(SenderIdentity::new("Carol", 3));
        msg.reply_to = Some(reply("quoted", false));

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "**Alice** (forwarded by Carol)");

        let payload = render(&msg, bridge(false), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "(forward from Carol)");
    }

    #[tokio::test]
    async fn test_reply_header_variants() {
        let discord = MockDiscord::default();
        let mut msg = message("hi");
        msg.reply_to = Some(reply("quoted", false));

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "**Alice** (in reply to Bob)");

        let payload = render(&msg, bridge(false), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "(in reply to Bob)");
    }

    #[tokio::test]
    async fn test_own_relay_reply_resolves_mention() {
        let mut discord = MockDiscord::default();
        discord.members.insert("Bob".to_string(), 555);

        let mut msg = message("hi");
        msg.reply_to = Some(reply("quoted", true));

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "**Alice** (in reply to <@555>)");
    }

    #[tokio::test]
    async fn test_own_relay_reply_falls_back_to_plain_name() {
        let discord = MockDiscord::default();
        let mut msg = message("hi");
        msg.reply_to = Some(reply("quoted", true));

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert_eq!(payload.header, "**Alice** (in reply to Bob)");
    }

    #[tokio::test]
    async fn test_quote_prepended_above_body() {
        let discord = MockDiscord::default();
        let mut msg = message("my answer");
        msg.reply_to = Some(reply("the question", false));

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert_eq!(payload.body, "> the question\nmy answer");
    }

    #[tokio::test]
    async fn test_attachment_carried_through() {
        let discord = MockDiscord::default();
        let mut msg = message("");
        msg.file = Some(FileRef {
            kind: FileKind::Photo,
            file_id: "p".to_string(),
            name: "photo.jpg".to_string(),
            link: Some("https://files/p".to_string()),
        });

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        let attachment = payload.attachment.unwrap();
        assert_eq!(attachment.name, "photo.jpg");
        assert_eq!(attachment.url, "https://files/p");
    }

    #[tokio::test]
    async fn test_unresolved_file_yields_no_attachment() {
        let discord = MockDiscord::default();
        let mut msg = message("text");
        msg.file = Some(FileRef {
            kind: FileKind::Document,
            file_id: "d".to_string(),
            name: "file.pdf".to_string(),
            link: None,
        });

        let payload = render(&msg, bridge(true), &discord, RenderLimits::default()).await;
        assert!(payload.attachment.is_none());
    }

    #[test]
    fn test_quote_char_truncation_with_ellipsis() {
        let limits = RenderLimits {
            max_reply_chars: 5,
            max_reply_lines: 3,
        };
        assert_eq!(render_quote("abcdefgh", limits), "> abcde…");
        assert_eq!(render_quote("abc", limits), "> abc");
    }

    #[test]
    fn test_quote_line_truncation() {
        let limits = RenderLimits {
            max_reply_chars: 100,
            max_reply_lines: 2,
        };
        assert_eq!(
            render_quote("one\ntwo\nthree", limits),
            "> one\n> two…"
        );
    }

    #[test]
    fn test_spoiler_rebalanced_when_source_was_balanced() {
        let limits = RenderLimits {
            max_reply_chars: 8,
            max_reply_lines: 3,
        };
        // Source "||secret|| x" has an even delimiter count; the cut leaves
        // one open delimiter, so a closing one is appended.
        assert_eq!(render_quote("||secret|| x", limits), "> ||secret…||");
    }

    #[test]
    fn test_spoiler_not_rebalanced_when_source_was_odd() {
        let limits = RenderLimits {
            max_reply_chars: 8,
            max_reply_lines: 3,
        };
        // The source itself has an odd count; the heuristic leaves it alone.
        assert_eq!(render_quote("||secret x y", limits), "> ||secret…");
    }
}
