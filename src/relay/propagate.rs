//! Edit/delete propagation.
//!
//! A source-side edit re-renders the message and mutates the correlated
//! destination message in place. An edit that collapses to the sentinel
//! deletes the destination side instead, when the bridge allows it.
//! Failures are logged per bridge and never retried.

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::common::{RelayError, SendError, StoreError};
use crate::platform::{DiscordApi, TelegramApi};
use crate::relay::executor::WATERMARK;
use crate::relay::message::CrossMessage;
use crate::relay::render::RenderedPayload;
use crate::store::CorrelationStore;

/// An edit to this lone character (with no annotations) requests deletion.
pub const DELETE_SENTINEL: &str = ".";

/// Shared dependencies of the propagator.
pub struct PropagatorDeps<'a> {
    pub telegram: &'a dyn TelegramApi,
    pub discord: &'a dyn DiscordApi,
    pub store: &'a CorrelationStore,
    /// Destination per-message length limit.
    pub max_message_length: usize,
}

/// True when the edited message collapsed to the delete sentinel.
pub fn is_delete_request(msg: &CrossMessage) -> bool {
    msg.text == DELETE_SENTINEL && msg.entities.is_empty()
}

/// Propagate one edited message across its bridges.
pub async fn propagate_edit(
    msg: &CrossMessage,
    payloads: Vec<RenderedPayload>,
    deps: &PropagatorDeps<'_>,
) {
    let attempts = payloads
        .into_iter()
        .map(|payload| propagate_one(msg, payload, deps));

    for result in join_all(attempts).await {
        match result {
            Ok(()) => {}
            Err(RelayError::Store(e)) if e.is_not_found() => {
                // The original relay never completed; nothing to mutate.
                warn!("edit propagation abandoned: {e}");
            }
            Err(e) => error!("edit propagation failed: {e}"),
        }
    }
}

async fn propagate_one(
    msg: &CrossMessage,
    payload: RenderedPayload,
    deps: &PropagatorDeps<'_>,
) -> Result<(), RelayError> {
    let bridge = &payload.bridge;

    if is_delete_request(msg) && bridge.cross_delete_on_discord {
        cross_delete(msg, &payload, deps).await
    } else {
        edit_in_place(msg, &payload, deps).await
    }
}

/// Delete the relayed destination messages, the triggering source message,
/// and the correlation entry.
async fn cross_delete(
    msg: &CrossMessage,
    payload: &RenderedPayload,
    deps: &PropagatorDeps<'_>,
) -> Result<(), RelayError> {
    let bridge = &payload.bridge;
    let dest_ids = lookup_dest_ids(msg, bridge.name.as_str(), deps.store)?;

    deps.discord
        .bulk_delete(bridge.discord_channel_id, &dest_ids)
        .await
        .map_err(|e| RelayError::DestinationSend {
            bridge: bridge.name.clone(),
            source: SendError::Failed {
                message: e.to_string(),
            },
        })?;

    // Another bridge on the same chat may already have deleted the source
    // message; a failed source delete must not leave the entry behind.
    if let Err(e) = deps
        .telegram
        .delete_message(msg.chat_id, msg.source_id)
        .await
    {
        let e = RelayError::SourceCall {
            message: e.to_string(),
        };
        warn!(bridge = %bridge.name, source_id = msg.source_id, "{e}");
    }

    deps.store.remove(
        crate::common::Direction::TelegramToDiscord,
        &bridge.name,
        msg.source_id,
    )?;

    info!(
        bridge = %bridge.name,
        source_id = msg.source_id,
        deleted = dest_ids.len(),
        "cross-deleted relayed message"
    );
    Ok(())
}

/// Re-render and mutate the tracked destination message in place.
///
/// Edits never re-chunk: the new text is truncated to the destination limit
/// and applied to the last tracked chunk, the one carrying the watermark.
async fn edit_in_place(
    msg: &CrossMessage,
    payload: &RenderedPayload,
    deps: &PropagatorDeps<'_>,
) -> Result<(), RelayError> {
    let bridge = &payload.bridge;
    let dest_ids = lookup_dest_ids(msg, bridge.name.as_str(), deps.store)?;
    // lookup_dest_ids rejects empty lists, so the last id exists.
    let Some(&target) = dest_ids.last() else {
        return Ok(());
    };

    let mut text: String = payload
        .full_text()
        .chars()
        .take(deps.max_message_length)
        .collect();
    text.push('\n');
    text.push_str(WATERMARK);

    deps.discord
        .edit_message(bridge.discord_channel_id, target, &text)
        .await
        .map_err(|e| RelayError::DestinationSend {
            bridge: bridge.name.clone(),
            source: SendError::Failed {
                message: e.to_string(),
            },
        })?;

    info!(
        bridge = %bridge.name,
        source_id = msg.source_id,
        dest_id = target,
        "propagated edit"
    );
    Ok(())
}

/// Fetch the correlated destination ids, treating an empty list as a miss.
fn lookup_dest_ids(
    msg: &CrossMessage,
    bridge_name: &str,
    store: &CorrelationStore,
) -> Result<Vec<u64>, RelayError> {
    let direction = crate::common::Direction::TelegramToDiscord;
    let ids = store.lookup(direction, bridge_name, msg.source_id)?;
    if ids.is_empty() {
        return Err(StoreError::NotFound {
            key: format!("{}:{}:{}", direction.token(), bridge_name, msg.source_id),
        }
        .into());
    }
    Ok(ids)
}
