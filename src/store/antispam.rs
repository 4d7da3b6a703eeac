//! Cool-down set for the "no bridge configured" notice.
//!
//! The first unroutable message in a chat produces a notice; further ones
//! are suppressed until a timed removal clears the chat id again. The set
//! is shared by reference between the relay service and the propagator,
//! neither owns it exclusively.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

/// Self-expiring set of chat ids currently suppressing the notice.
#[derive(Debug, Clone)]
pub struct AntiSpamSet {
    chats: Arc<Mutex<HashSet<i64>>>,
    cooldown: Duration,
}

impl AntiSpamSet {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            chats: Arc::new(Mutex::new(HashSet::new())),
            cooldown,
        }
    }

    /// Try to start a suppression window for the chat.
    ///
    /// Returns true when the caller should post the notice now; false while
    /// the chat is already in its cool-down. Insertion schedules the delayed
    /// removal; the timer is not tied to any in-flight work.
    pub async fn begin_suppression(&self, chat_id: i64) -> bool {
        {
            let mut chats = self.chats.lock().await;
            if !chats.insert(chat_id) {
                return false;
            }
        }

        let chats = Arc::clone(&self.chats);
        let cooldown = self.cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            chats.lock().await.remove(&chat_id);
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_notice_allowed_then_suppressed() {
        let set = AntiSpamSet::new(Duration::from_secs(60));

        assert!(set.begin_suppression(-1001).await);
        assert!(!set.begin_suppression(-1001).await);

        // A different chat has its own window.
        assert!(set.begin_suppression(-1002).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppression_expires_after_cooldown() {
        let set = AntiSpamSet::new(Duration::from_secs(60));

        assert!(set.begin_suppression(-1001).await);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(set.begin_suppression(-1001).await);
    }
}
