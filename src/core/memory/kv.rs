use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::KeyValueStore;
use crate::platform::{NativePlatform, Platform};

pub const DATABASE_FILE: &str = "medisocial.db";

pub struct SqliteKeyValueStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            tokio::fs::create_dir_all(data_dir).await?;
        }
        NativePlatform::restrict_dir_permissions(data_dir);

        let db_path = data_dir.join(DATABASE_FILE);
        let db = Connection::open(&db_path)?;
        NativePlatform::restrict_file_permissions(&db_path);
        info!("Opened key-value store at {}", db_path.display());
        Self::with_connection(db)
    }

    pub fn with_connection(db: Connection) -> Result<Self> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare("SELECT value FROM kv_store WHERE key = ?1 LIMIT 1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_get_missing_key_returns_none() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        assert_eq!(store.get("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sqlite_set_overwrites_existing() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        store.set("key", "old").await.unwrap();
        store.set("key", "new").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        let tmpdir = tempfile::tempdir().unwrap();
        {
            let store = SqliteKeyValueStore::open(tmpdir.path()).await.unwrap();
            store.set("medisocial_history", "[]").await.unwrap();
        }
        let store = SqliteKeyValueStore::open(tmpdir.path()).await.unwrap();
        assert_eq!(
            store.get("medisocial_history").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn in_memory_store_round_trips_unicode() {
        let store = InMemoryKeyValueStore::new();
        store.set("draft", "Joelho é vida 🦵").await.unwrap();
        assert_eq!(
            store.get("draft").await.unwrap(),
            Some("Joelho é vida 🦵".to_string())
        );
    }
}
