//! The relay pipeline: enrichment, rendering, delivery, propagation.

pub mod executor;
pub mod markup;
pub mod message;
pub mod pipeline;
pub mod propagate;
pub mod raw;
pub mod render;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::bridge::{
    relaying_commands, relaying_join_notices, relaying_leave_notices, without_direction, Bridge,
    BridgeRegistry,
};
use crate::common::{Direction, RelayError};
use crate::config::Config;
use crate::platform::{DiscordApi, TelegramApi};
use crate::store::{AntiSpamSet, CorrelationStore};

use executor::ExecutorDeps;
use pipeline::EnrichOptions;
use propagate::PropagatorDeps;
use raw::{RawMessage, RawUpdate, UpdateKind};
use render::RenderLimits;

pub use message::CrossMessage;
pub use render::RenderedPayload;

/// Notice posted to a chat with no configured bridge.
const UNROUTABLE_NOTICE: &str =
    "This chat has no bridge configured; messages are not relayed.";

/// The relay service: the seam the platform transports drive.
///
/// Owns the registry and the shared stores; holds the two platform
/// capabilities as trait objects. One call to [`Relay::handle_update`]
/// processes one inbound update end to end.
pub struct Relay {
    registry: BridgeRegistry,
    store: CorrelationStore,
    anti_spam: AntiSpamSet,
    telegram: Arc<dyn TelegramApi>,
    discord: Arc<dyn DiscordApi>,
    enrich_options: EnrichOptions,
    render_limits: RenderLimits,
    max_message_length: usize,
}

impl Relay {
    /// Build the service from configuration and injected collaborators.
    ///
    /// `bot_user_id` is the relay's own Telegram user id, known to the
    /// transport after login; it is how replies to our own relays are
    /// recognized.
    pub fn new(
        config: &Config,
        store: CorrelationStore,
        telegram: Arc<dyn TelegramApi>,
        discord: Arc<dyn DiscordApi>,
        bot_user_id: i64,
    ) -> Self {
        Self {
            registry: BridgeRegistry::from_config(config),
            store,
            anti_spam: AntiSpamSet::new(Duration::from_secs(
                config.relay.unroutable_cooldown_secs,
            )),
            telegram,
            discord,
            enrich_options: EnrichOptions {
                bot_user_id,
                relay_sticker_emoji: config.telegram.relay_sticker_emoji,
            },
            render_limits: RenderLimits {
                max_reply_chars: config.discord.max_reply_chars,
                max_reply_lines: config.discord.max_reply_lines,
            },
            max_message_length: config.discord.max_message_length,
        }
    }

    /// Process one inbound update. All failures are logged, never bubbled:
    /// nothing in the relay path is retried.
    pub async fn handle_update(&self, update: RawUpdate) {
        let Some((raw, kind)) = update.select() else {
            debug!("update carried no message, ignoring");
            return;
        };

        let routed = without_direction(
            &self.registry.bridges_for_chat(raw.chat.id),
            Direction::DiscordToTelegram,
        );
        if routed.is_empty() {
            debug!("{}", RelayError::Unroutable { chat_id: raw.chat.id });
            self.notify_unroutable(raw).await;
            return;
        }

        if !raw.new_chat_members.is_empty() || raw.left_chat_member.is_some() {
            let bridges = self.membership_bridges(raw, &routed);
            self.relay_membership_notices(raw, &bridges).await;
            return;
        }

        let bridges = if is_command(raw) {
            let commands = relaying_commands(&routed);
            if commands.is_empty() {
                debug!(chat_id = raw.chat.id, "command not relayed on any bridge");
                return;
            }
            commands
        } else {
            routed
        };

        let msg = match pipeline::enrich(raw, &self.enrich_options, self.telegram.as_ref()).await {
            Ok(Some(msg)) => msg,
            Ok(None) => return,
            Err(e) => {
                error!("enrichment failed: {e}");
                return;
            }
        };

        let payloads = join_all(bridges.into_iter().map(|bridge| {
            render::render(
                &msg,
                bridge,
                self.discord.as_ref(),
                self.render_limits,
            )
        }))
        .await;

        match kind {
            UpdateKind::New | UpdateKind::ChannelPost => {
                let deps = ExecutorDeps {
                    discord: self.discord.as_ref(),
                    store: &self.store,
                    max_message_length: self.max_message_length,
                };
                executor::relay(&msg, payloads, &deps).await;
            }
            UpdateKind::Edited => {
                let deps = PropagatorDeps {
                    telegram: self.telegram.as_ref(),
                    discord: self.discord.as_ref(),
                    store: &self.store,
                    max_message_length: self.max_message_length,
                };
                propagate::propagate_edit(&msg, payloads, &deps).await;
            }
        }
    }

    /// Bridges that relay this membership notice.
    fn membership_bridges(&self, raw: &RawMessage, routed: &[Arc<Bridge>]) -> Vec<Arc<Bridge>> {
        if !raw.new_chat_members.is_empty() {
            relaying_join_notices(routed)
        } else {
            relaying_leave_notices(routed)
        }
    }

    /// Send join/leave notices. These carry no correlation entries; there
    /// is nothing on the source side to edit or delete later.
    async fn relay_membership_notices(&self, raw: &RawMessage, bridges: &[Arc<Bridge>]) {
        let mut events = Vec::new();
        for user in &raw.new_chat_members {
            events.push((user.display_name(), "joined"));
        }
        if let Some(user) = &raw.left_chat_member {
            events.push((user.display_name(), "left"));
        }

        for bridge in bridges {
            for (name, verb) in &events {
                // Member names follow the same per-bridge policy as headers.
                let notice = if bridge.send_usernames {
                    format!("**{name}** {verb} the Telegram side of the chat")
                } else {
                    format!("{name} {verb} the Telegram side of the chat")
                };
                if let Err(e) = self
                    .discord
                    .send(bridge.discord_channel_id, &notice, None)
                    .await
                {
                    error!(bridge = %bridge.name, "failed to relay membership notice: {e}");
                }
            }
        }
    }

    /// Inform the chat it is unroutable, at most once per cool-down.
    async fn notify_unroutable(&self, raw: &RawMessage) {
        if !self.anti_spam.begin_suppression(raw.chat.id).await {
            debug!(chat_id = raw.chat.id, "unroutable notice suppressed");
            return;
        }
        if let Err(e) = self
            .telegram
            .reply(raw.chat.id, raw.message_id, UNROUTABLE_NOTICE)
            .await
        {
            warn!(chat_id = raw.chat.id, "failed to post unroutable notice: {e}");
        }
    }
}

fn is_command(raw: &RawMessage) -> bool {
    raw.text.as_deref().is_some_and(|t| t.starts_with('/'))
}
