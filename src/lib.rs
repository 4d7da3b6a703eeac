//! Courier - Telegram-Discord relay core.
//!
//! Relays messages between a Telegram chat and a Discord channel while
//! preserving identity, reply/forward lineage, and edit/delete semantics.
//! The crate contains the correlation and relay pipeline only: platform
//! transports, configuration files, and process bootstrap live outside and
//! drive [`relay::Relay`] through the capability traits in [`platform`].

pub mod bridge;
pub mod common;
pub mod config;
pub mod platform;
pub mod relay;
pub mod store;

pub use bridge::{Bridge, BridgeRegistry};
pub use common::{Direction, RelayError, SenderIdentity};
pub use config::Config;
pub use platform::{Attachment, DiscordApi, TelegramApi};
pub use relay::{CrossMessage, Relay, RenderedPayload};
pub use store::{AntiSpamSet, CorrelationStore};
