//! Configuration validation.

use std::collections::HashSet;

use super::{Config, ConfigError};

/// Validate a loaded configuration.
///
/// An empty bridge list is allowed; every inbound message is then unroutable.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for bridge in &config.bridges {
        if bridge.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "bridge name must not be empty".to_string(),
            });
        }

        if !names.insert(bridge.name.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("duplicate bridge name '{}'", bridge.name),
            });
        }
    }

    if config.discord.max_message_length == 0 {
        return Err(ConfigError::ValidationError {
            message: "discord.max_message_length must be at least 1".to_string(),
        });
    }

    Ok(())
}
