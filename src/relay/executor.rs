//! Chunked delivery of rendered payloads.
//!
//! Bridges are independent: payloads relay concurrently across bridges and
//! a failure on one never aborts the others. Within a bridge, chunks go out
//! strictly in order so destination-side reading order matches the source.

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::common::{Direction, RelayError, SendError};
use crate::platform::DiscordApi;
use crate::relay::message::CrossMessage;
use crate::relay::render::RenderedPayload;
use crate::store::CorrelationStore;

/// Trailing watermark line appended to the final chunk of every relayed
/// message and every propagated edit.
pub const WATERMARK: &str = "\u{200B}";

/// Notice substituted when the destination rejects an attachment by size.
const ATTACHMENT_NOTICE: &str = "*[attachment too large to relay]*";

/// Shared dependencies of the executor.
pub struct ExecutorDeps<'a> {
    pub discord: &'a dyn DiscordApi,
    pub store: &'a CorrelationStore,
    /// Destination per-message length limit.
    pub max_message_length: usize,
}

/// Split text into ordered chunks of at most `limit` Unicode scalars.
///
/// Concatenating the chunks reconstructs the input exactly; the chunk count
/// is ceil(len / limit). Empty input yields one empty chunk.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    chunks.push(current);
    chunks
}

/// Relay one enriched message to every selected bridge.
///
/// Each bridge is one independent attempt; failures are captured and logged
/// per bridge with the bridge name and cause.
pub async fn relay(msg: &CrossMessage, payloads: Vec<RenderedPayload>, deps: &ExecutorDeps<'_>) {
    let attempts = payloads
        .into_iter()
        .map(|payload| relay_one(msg, payload, deps));

    for result in join_all(attempts).await {
        if let Err(e) = result {
            error!("relay failed: {e}");
        }
    }
}

/// Deliver one payload over one bridge and record the correlation entry.
async fn relay_one(
    msg: &CrossMessage,
    payload: RenderedPayload,
    deps: &ExecutorDeps<'_>,
) -> Result<(), RelayError> {
    let bridge = &payload.bridge;
    let channel_id = bridge.discord_channel_id;

    let mut chunks = split_chunks(&payload.full_text(), deps.max_message_length);
    if let Some(last) = chunks.last_mut() {
        last.push('\n');
        last.push_str(WATERMARK);
    }

    let mut dest_ids = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let attachment = if index == 0 { payload.attachment.as_ref() } else { None };

        let sent = match deps.discord.send(channel_id, chunk, attachment).await {
            Ok(id) => id,
            Err(SendError::AttachmentTooLarge) if attachment.is_some() => {
                warn!(
                    bridge = %bridge.name,
                    "destination rejected attachment by size, substituting notice"
                );
                let with_notice = format!("{chunk}\n{ATTACHMENT_NOTICE}");
                deps.discord
                    .send(channel_id, &with_notice, None)
                    .await
                    .map_err(|source| RelayError::DestinationSend {
                        bridge: bridge.name.clone(),
                        source,
                    })?
            }
            Err(source) => {
                return Err(RelayError::DestinationSend {
                    bridge: bridge.name.clone(),
                    source,
                });
            }
        };
        dest_ids.push(sent);
    }

    deps.store.insert(
        Direction::TelegramToDiscord,
        &bridge.name,
        msg.source_id,
        &dest_ids,
    )?;

    info!(
        bridge = %bridge.name,
        source_id = msg.source_id,
        chunks = dest_ids.len(),
        "relayed message"
    );
    Ok(())
}
