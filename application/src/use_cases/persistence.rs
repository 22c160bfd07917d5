//! Snapshot persistence for the conversation collection.
//!
//! The whole collection (conversations plus active id) is written as one
//! JSON document under a single storage key. It is saved when a stream
//! settles and after create/switch, never per chunk, so a crash mid-stream
//! loses the reply in progress.

use crate::config::DEFAULT_SNAPSHOT_KEY;
use crate::ports::storage::{KeyValueStorage, StorageError};
use std::sync::Arc;
use streamchat_domain::ConversationCollection;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while saving or restoring a snapshot
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Stored snapshot is corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("Could not serialize snapshot: {0}")]
    Serialize(serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Saves and restores [`ConversationCollection`] snapshots
pub struct SnapshotStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl SnapshotStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, collection: &ConversationCollection) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(collection).map_err(PersistenceError::Serialize)?;
        self.storage.set(&self.key, &json)?;
        debug!(
            "Saved snapshot '{}' ({} conversations, {} bytes)",
            self.key,
            collection.len(),
            json.len()
        );
        Ok(())
    }

    /// Save, logging instead of returning a failure.
    ///
    /// Used on the streaming path, where a storage error must not turn a
    /// finished reply into a failed one.
    pub fn save_or_warn(&self, collection: &ConversationCollection) {
        if let Err(e) = self.save(collection) {
            warn!("Could not persist conversations: {}", e);
        }
    }

    /// Restore the last snapshot, distinguishing "absent" from "corrupt".
    pub fn try_load(&self) -> Result<Option<ConversationCollection>, PersistenceError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(PersistenceError::Corrupt)
    }

    /// Restore the last snapshot; any failure reads as "nothing saved".
    pub fn load(&self) -> Option<ConversationCollection> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring saved conversations: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.storage.remove(&self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::MemoryStorage;
    use streamchat_domain::Message;

    struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    fn sample() -> ConversationCollection {
        let mut collection = ConversationCollection::new();
        let first = collection.create_conversation();
        collection
            .append_message(&first, Message::user("What is Rust?"))
            .unwrap();
        collection
            .append_message(&first, Message::assistant("A language."))
            .unwrap();
        let second = collection.create_conversation();
        collection.set_active(&second).unwrap();
        collection
    }

    #[test]
    fn save_then_load_round_trips() {
        let storage = Arc::new(MemoryStorage::default());
        let snapshots = SnapshotStore::new(storage.clone());
        let original = sample();

        snapshots.save(&original).unwrap();
        let restored = snapshots.load().unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored.active_id(), original.active_id());
        assert!(storage.raw("chatState").is_some());
    }

    #[test]
    fn missing_snapshot_is_absent() {
        let snapshots = SnapshotStore::new(Arc::new(MemoryStorage::default()));
        assert!(snapshots.load().is_none());
        assert!(snapshots.try_load().unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_is_absent() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set("chatState", "{not json").unwrap();
        let snapshots = SnapshotStore::new(storage);

        assert!(matches!(
            snapshots.try_load(),
            Err(PersistenceError::Corrupt(_))
        ));
        assert!(snapshots.load().is_none());
    }

    #[test]
    fn storage_failure_is_absent_on_load_and_swallowed_on_save_or_warn() {
        let snapshots = SnapshotStore::new(Arc::new(FailingStorage));
        assert!(snapshots.load().is_none());
        assert!(snapshots.save(&sample()).is_err());
        snapshots.save_or_warn(&sample());
    }

    #[test]
    fn clear_removes_snapshot() {
        let storage = Arc::new(MemoryStorage::default());
        let snapshots = SnapshotStore::with_key(storage, "custom");
        snapshots.save(&sample()).unwrap();
        snapshots.clear().unwrap();
        assert!(snapshots.load().is_none());
        assert_eq!(snapshots.key(), "custom");
    }
}
