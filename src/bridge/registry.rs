//! Bridge registry: per-chat lookup of configured links and pure policy filters.
//!
//! A `Bridge` is immutable once loaded and shared by reference; the registry
//! indexes bridges by Telegram chat id so per-message lookup is a map hit.

use std::collections::HashMap;
use std::sync::Arc;

use crate::common::Direction;
use crate::config::{BridgeConfig, Config};

/// A configured link between one Telegram chat and one Discord channel.
#[derive(Debug)]
pub struct Bridge {
    /// Unique bridge name.
    pub name: String,
    /// Message flow direction.
    pub direction: Direction,
    /// Telegram chat id.
    pub telegram_chat_id: i64,
    /// Discord channel id.
    pub discord_channel_id: u64,
    /// Relay bot commands (messages starting with '/').
    pub relay_commands: bool,
    /// Relay member join notices.
    pub relay_join_messages: bool,
    /// Relay member leave notices.
    pub relay_leave_messages: bool,
    /// Prefix relayed messages with the sender's name.
    pub send_usernames: bool,
    /// Delete the Discord side when the source message is edited to the sentinel.
    pub cross_delete_on_discord: bool,
}

impl Bridge {
    /// Build a bridge from its config entry.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            name: config.name.clone(),
            direction: config
                .direction
                .as_deref()
                .map(Direction::from_str)
                .unwrap_or(Direction::Both),
            telegram_chat_id: config.telegram_chat_id,
            discord_channel_id: config.discord_channel_id,
            relay_commands: config.relay_commands,
            relay_join_messages: config.relay_join_messages,
            relay_leave_messages: config.relay_leave_messages,
            send_usernames: config.send_usernames,
            cross_delete_on_discord: config.cross_delete_on_discord,
        }
    }
}

/// Registry of configured bridges, indexed by Telegram chat id.
#[derive(Debug)]
pub struct BridgeRegistry {
    bridges: Vec<Arc<Bridge>>,
    by_telegram_chat: HashMap<i64, Vec<usize>>,
}

impl BridgeRegistry {
    /// Create a registry from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut bridges = Vec::new();
        let mut by_telegram_chat: HashMap<i64, Vec<usize>> = HashMap::new();

        for entry in &config.bridges {
            let bridge = Arc::new(Bridge::from_config(entry));
            let idx = bridges.len();
            by_telegram_chat
                .entry(bridge.telegram_chat_id)
                .or_default()
                .push(idx);
            bridges.push(bridge);
        }

        Self {
            bridges,
            by_telegram_chat,
        }
    }

    /// Bridges configured for the given Telegram chat, in config order.
    pub fn bridges_for_chat(&self, chat_id: i64) -> Vec<Arc<Bridge>> {
        self.by_telegram_chat
            .get(&chat_id)
            .map(|indices| indices.iter().map(|&i| Arc::clone(&self.bridges[i])).collect())
            .unwrap_or_default()
    }

    /// All configured bridges.
    pub fn all(&self) -> &[Arc<Bridge>] {
        &self.bridges
    }
}

/// Drop bridges whose direction equals `direction`. Order-preserving.
pub fn without_direction(bridges: &[Arc<Bridge>], direction: Direction) -> Vec<Arc<Bridge>> {
    bridges
        .iter()
        .filter(|b| b.direction != direction)
        .cloned()
        .collect()
}

/// Keep only bridges that relay bot commands. Order-preserving.
pub fn relaying_commands(bridges: &[Arc<Bridge>]) -> Vec<Arc<Bridge>> {
    bridges.iter().filter(|b| b.relay_commands).cloned().collect()
}

/// Keep only bridges that relay member join notices. Order-preserving.
pub fn relaying_join_notices(bridges: &[Arc<Bridge>]) -> Vec<Arc<Bridge>> {
    bridges
        .iter()
        .filter(|b| b.relay_join_messages)
        .cloned()
        .collect()
}

/// Keep only bridges that relay member leave notices. Order-preserving.
pub fn relaying_leave_notices(bridges: &[Arc<Bridge>]) -> Vec<Arc<Bridge>> {
    bridges
        .iter()
        .filter(|b| b.relay_leave_messages)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;

    fn bridge_config(name: &str, chat_id: i64, direction: Option<&str>) -> BridgeConfig {
        BridgeConfig {
            name: name.to_string(),
            direction: direction.map(String::from),
            telegram_chat_id: chat_id,
            discord_channel_id: 100,
            relay_commands: false,
            relay_join_messages: true,
            relay_leave_messages: true,
            send_usernames: true,
            cross_delete_on_discord: false,
        }
    }

    fn registry_with(entries: Vec<BridgeConfig>) -> BridgeRegistry {
        let config = Config {
            telegram: Default::default(),
            discord: Default::default(),
            relay: Default::default(),
            bridges: entries,
        };
        BridgeRegistry::from_config(&config)
    }

    #[test]
    fn test_lookup_by_chat() {
        let registry = registry_with(vec![
            bridge_config("a", -1001, None),
            bridge_config("b", -1002, None),
            bridge_config("c", -1001, None),
        ]);

        let found = registry.bridges_for_chat(-1001);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "a");
        assert_eq!(found[1].name, "c");

        assert!(registry.bridges_for_chat(-9999).is_empty());
    }

    #[test]
    fn test_without_direction() {
        let registry = registry_with(vec![
            bridge_config("a", -1001, Some("both")),
            bridge_config("b", -1001, Some("discord_to_telegram")),
        ]);

        let bridges = registry.bridges_for_chat(-1001);
        let filtered = without_direction(&bridges, Direction::DiscordToTelegram);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "a");
    }

    #[test]
    fn test_filters_are_idempotent() {
        let mut commands = bridge_config("a", -1001, None);
        commands.relay_commands = true;
        let registry = registry_with(vec![
            commands,
            bridge_config("b", -1001, None),
            bridge_config("c", -1001, None),
        ]);

        let bridges = registry.bridges_for_chat(-1001);
        let once = relaying_commands(&bridges);
        let twice = relaying_commands(&once);
        assert_eq!(once.len(), 1);
        assert_eq!(
            once.iter().map(|b| &b.name).collect::<Vec<_>>(),
            twice.iter().map(|b| &b.name).collect::<Vec<_>>()
        );

        let once = relaying_join_notices(&bridges);
        let twice = relaying_join_notices(&once);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_filters_preserve_order() {
        let registry = registry_with(vec![
            bridge_config("first", -1001, None),
            bridge_config("second", -1001, None),
            bridge_config("third", -1001, None),
        ]);

        let bridges = registry.bridges_for_chat(-1001);
        let filtered = relaying_leave_notices(&bridges);
        let names: Vec<_> = filtered.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
