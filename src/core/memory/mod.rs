mod kv;
mod session;

use anyhow::Result;
use async_trait::async_trait;

pub use kv::{InMemoryKeyValueStore, SqliteKeyValueStore};
pub use session::{PersistenceStore, StoredSession};

pub const HISTORY_KEY: &str = "medisocial_history";
pub const DRAFT_KEY: &str = "medisocial_last_post";
pub const RTS_HISTORY_KEY: &str = "rts_history";

/// Durable string-keyed medium holding serialized blobs. Injected at startup
/// so tests can substitute an in-memory fake.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Full overwrite of `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
