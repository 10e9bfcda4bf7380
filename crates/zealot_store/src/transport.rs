//! Transport trait over the backing key-value store.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Raw byte-level store access plus the session primitives locks need.
///
/// Two implementations exist: `HttpTransport` speaks to a live agent and
/// `MemoryTransport` backs tests and local development. Values are opaque
/// bytes at this level; typed decoding lives in `NamespacedKv`.
#[async_trait]
pub trait KvTransport: Send + Sync {
    /// Read the value at `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, creating or overwriting it.
    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Create a session with the given TTL, returning its id.
    async fn create_session(&self, name: &str, ttl: &str) -> StoreResult<String>;

    /// Destroy a session, releasing anything it holds.
    async fn destroy_session(&self, session: &str) -> StoreResult<()>;

    /// Try to acquire `key` for `session`. Returns false when another
    /// session already holds it.
    async fn acquire(&self, key: &str, session: &str) -> StoreResult<bool>;

    /// Release `key` held by `session`. Returns false when the session did
    /// not hold it.
    async fn release(&self, key: &str, session: &str) -> StoreResult<bool>;
}
