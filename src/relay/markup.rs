//! Entity-to-markup translation.
//!
//! Converts source annotation spans into destination markdown and resolves
//! user mentions to destination-native mentions where a member matches.
//! Spans are assumed non-overlapping (a source platform guarantee);
//! overlapping or out-of-range spans are skipped rather than panicking.

use tracing::debug;

use crate::platform::DiscordApi;
use crate::relay::message::{EntityKind, EntitySpan};

/// Render annotated text as destination markdown.
///
/// Mention spans are looked up through the destination member list; an
/// unmatched or failing lookup keeps the literal text.
pub async fn translate(
    text: &str,
    entities: &[EntitySpan],
    discord: &dyn DiscordApi,
    channel_id: u64,
) -> String {
    if entities.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut spans: Vec<&EntitySpan> = entities.iter().collect();
    spans.sort_by_key(|s| s.offset);

    let mut out = String::with_capacity(text.len() + entities.len() * 4);
    let mut cursor = 0usize;

    for span in spans {
        let end = span.offset.saturating_add(span.length);
        if span.offset < cursor || end > chars.len() {
            debug!(
                offset = span.offset,
                length = span.length,
                "skipping overlapping or out-of-range entity span"
            );
            continue;
        }

        out.extend(&chars[cursor..span.offset]);
        let body: String = chars[span.offset..end].iter().collect();

        match span.kind {
            EntityKind::Bold => {
                out.push_str("**");
                out.push_str(&body);
                out.push_str("**");
            }
            EntityKind::Italic => {
                out.push('*');
                out.push_str(&body);
                out.push('*');
            }
            EntityKind::Code => {
                out.push('`');
                out.push_str(&body);
                out.push('`');
            }
            EntityKind::Pre => {
                out.push_str("```\n");
                out.push_str(&body);
                out.push_str("\n```");
            }
            EntityKind::Spoiler => {
                out.push_str("||");
                out.push_str(&body);
                out.push_str("||");
            }
            EntityKind::TextLink => match &span.url {
                Some(url) => {
                    out.push('[');
                    out.push_str(&body);
                    out.push_str("](");
                    out.push_str(url);
                    out.push(')');
                }
                None => out.push_str(&body),
            },
            EntityKind::Mention => {
                let name = body.trim_start_matches('@');
                match discord.find_member_by_display_name(channel_id, name).await {
                    Ok(Some(member_id)) => {
                        out.push_str(&format!("<@{member_id}>"));
                    }
                    Ok(None) => out.push_str(&body),
                    Err(e) => {
                        debug!("member lookup failed for '{name}': {e}");
                        out.push_str(&body);
                    }
                }
            }
        }

        cursor = end;
    }

    out.extend(&chars[cursor..]);
    out
}
