//! Durable message-ID correlation store.
//!
//! Maps (direction, bridge, source-message-id) to the ordered list of
//! destination message ids a relay produced. Backed by redb so edit and
//! delete propagation keeps working across process restarts. Each operation
//! is one transaction, so per-key insert/lookup/remove are atomic.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};

use crate::common::{Direction, StoreError, StoreResult};

const CORRELATION: TableDefinition<'static, &str, &[u8]> = TableDefinition::new("correlation");

/// Bidirectional index from source message to relayed destination messages.
#[derive(Debug, Clone)]
pub struct CorrelationStore {
    db: Arc<Database>,
}

impl CorrelationStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::new(Arc::new(db))
    }

    /// Wrap an existing database handle.
    pub fn new(db: Arc<Database>) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(CORRELATION)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    fn key(direction: Direction, bridge: &str, source_id: i64) -> String {
        format!("{}:{}:{}", direction.token(), bridge, source_id)
    }

    /// Record the destination ids produced for one source message.
    ///
    /// At most one entry exists per key; relaying the same source message
    /// again replaces the previous list.
    pub fn insert(
        &self,
        direction: Direction,
        bridge: &str,
        source_id: i64,
        dest_ids: &[u64],
    ) -> StoreResult<()> {
        let key = Self::key(direction, bridge, source_id);
        let value = serde_json::to_vec(dest_ids)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CORRELATION)?;
            table.insert(key.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up the destination ids for one source message.
    ///
    /// A miss is a defined failure (`StoreError::NotFound`), not undefined
    /// behavior: it means the original relay never completed.
    pub fn lookup(
        &self,
        direction: Direction,
        bridge: &str,
        source_id: i64,
    ) -> StoreResult<Vec<u64>> {
        let key = Self::key(direction, bridge, source_id);

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CORRELATION)?;

        match table.get(key.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound { key }),
        }
    }

    /// Remove the entry for one source message. Removing an absent key is a no-op.
    pub fn remove(&self, direction: Direction, bridge: &str, source_id: i64) -> StoreResult<()> {
        let key = Self::key(direction, bridge, source_id);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CORRELATION)?;
            table.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, CorrelationStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CorrelationStore::open(dir.path().join("courier.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_lookup_round_trip() {
        let (_dir, store) = open_temp();

        store
            .insert(Direction::TelegramToDiscord, "general", 10, &[100, 101])
            .unwrap();
        let ids = store
            .lookup(Direction::TelegramToDiscord, "general", 10)
            .unwrap();
        assert_eq!(ids, vec![100, 101]);
    }

    #[test]
    fn test_lookup_miss_is_not_found() {
        let (_dir, store) = open_temp();

        let err = store
            .lookup(Direction::TelegramToDiscord, "general", 99)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_then_lookup_fails() {
        let (_dir, store) = open_temp();

        store
            .insert(Direction::TelegramToDiscord, "general", 10, &[100])
            .unwrap();
        store
            .remove(Direction::TelegramToDiscord, "general", 10)
            .unwrap();

        let err = store
            .lookup(Direction::TelegramToDiscord, "general", 10)
            .unwrap_err();
        assert!(err.is_not_found());

        // Removing again is harmless.
        store
            .remove(Direction::TelegramToDiscord, "general", 10)
            .unwrap();
    }

    #[test]
    fn test_keys_are_scoped_by_direction_and_bridge() {
        let (_dir, store) = open_temp();

        store
            .insert(Direction::TelegramToDiscord, "a", 10, &[1])
            .unwrap();
        store
            .insert(Direction::DiscordToTelegram, "a", 10, &[2])
            .unwrap();
        store
            .insert(Direction::TelegramToDiscord, "b", 10, &[3])
            .unwrap();

        assert_eq!(
            store.lookup(Direction::TelegramToDiscord, "a", 10).unwrap(),
            vec![1]
        );
        assert_eq!(
            store.lookup(Direction::DiscordToTelegram, "a", 10).unwrap(),
            vec![2]
        );
        assert_eq!(
            store.lookup(Direction::TelegramToDiscord, "b", 10).unwrap(),
            vec![3]
        );
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courier.redb");

        {
            let store = CorrelationStore::open(&path).unwrap();
            store
                .insert(Direction::TelegramToDiscord, "general", 10, &[100])
                .unwrap();
        }

        let store = CorrelationStore::open(&path).unwrap();
        assert_eq!(
            store
                .lookup(Direction::TelegramToDiscord, "general", 10)
                .unwrap(),
            vec![100]
        );
    }
}
