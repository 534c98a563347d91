use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

use super::{DRAFT_KEY, HISTORY_KEY, KeyValueStore, RTS_HISTORY_KEY};
use crate::core::generation::types::GeneratedResult;
use crate::core::rts::RtsHistoryEntry;

/// What `load()` found in the durable medium.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSession {
    /// Newest first.
    pub history: Vec<GeneratedResult>,
    pub draft: Option<GeneratedResult>,
}

/// Write-through persistence for the post history log and the draft slot.
/// The only component that reads or writes the durable medium.
#[derive(Clone)]
pub struct PersistenceStore {
    medium: Arc<dyn KeyValueStore>,
}

impl PersistenceStore {
    pub fn new(medium: Arc<dyn KeyValueStore>) -> Self {
        Self { medium }
    }

    /// Unreadable or malformed payloads count as absent. They are left in place
    /// and overwritten by the next save.
    pub async fn load(&self) -> StoredSession {
        let history: Vec<GeneratedResult> = self.read(HISTORY_KEY).await.unwrap_or_default();
        let draft = self.read(DRAFT_KEY).await;
        info!(
            "Loaded {} history entries (draft present: {})",
            history.len(),
            draft.is_some()
        );
        StoredSession { history, draft }
    }

    pub async fn save_history(&self, history: &[GeneratedResult]) {
        self.write(HISTORY_KEY, &history).await;
    }

    pub async fn save_draft(&self, draft: &GeneratedResult) {
        self.write(DRAFT_KEY, draft).await;
    }

    pub async fn load_rts_history(&self) -> Vec<RtsHistoryEntry> {
        self.read(RTS_HISTORY_KEY).await.unwrap_or_default()
    }

    pub async fn save_rts_history(&self, entries: &[RtsHistoryEntry]) {
        self.write(RTS_HISTORY_KEY, entries).await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.medium.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{}' from store: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding malformed '{}' payload: {}", key, e);
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.medium.set(key, &json).await {
            warn!("Failed to persist '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::types::PostContent;
    use crate::core::memory::InMemoryKeyValueStore;

    fn result(headline: &str) -> GeneratedResult {
        GeneratedResult::new(
            PostContent {
                headline: headline.into(),
                caption: format!("{} caption", headline),
                ..Default::default()
            },
            None,
            false,
        )
    }

    fn store() -> (Arc<InMemoryKeyValueStore>, PersistenceStore) {
        let medium = Arc::new(InMemoryKeyValueStore::new());
        (medium.clone(), PersistenceStore::new(medium))
    }

    #[tokio::test]
    async fn first_run_loads_empty_state() {
        let (_, store) = store();
        assert_eq!(store.load().await, StoredSession::default());
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let (_, store) = store();
        store.save_history(&[result("b"), result("a")]).await;
        store.save_draft(&result("b")).await;
        let first = store.load().await;
        let second = store.load().await;
        assert_eq!(first, second);
        assert_eq!(first.history.len(), 2);
        assert_eq!(first.history[0].content.headline, "b");
    }

    #[tokio::test]
    async fn malformed_payload_is_treated_as_empty() {
        let (medium, store) = store();
        medium.set(HISTORY_KEY, "{not json").await.unwrap();
        medium.set(DRAFT_KEY, "[1,2,3]").await.unwrap();
        let loaded = store.load().await;
        assert!(loaded.history.is_empty());
        assert!(loaded.draft.is_none());
        // Not repaired: the raw payload is still there until the next save.
        assert_eq!(
            medium.get(HISTORY_KEY).await.unwrap(),
            Some("{not json".to_string())
        );

        store.save_history(&[result("fresh")]).await;
        assert_eq!(store.load().await.history.len(), 1);
    }

    #[tokio::test]
    async fn save_is_a_full_overwrite() {
        let (_, store) = store();
        store.save_history(&[result("a"), result("b")]).await;
        store.save_history(&[result("c")]).await;
        let loaded = store.load().await;
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.history[0].content.headline, "c");
    }
}
