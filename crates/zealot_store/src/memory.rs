//! In-process transport for tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::transport::KvTransport;

/// Clone-shared in-memory transport.
///
/// Clones share state, so a test can keep one handle for seeding and
/// assertions while the code under test owns another. Failure injection
/// turns reads or writes into the corresponding store errors.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    locks: Arc<RwLock<HashMap<String, String>>>,
    read_failure: Arc<RwLock<Option<String>>>,
    write_failure: Arc<RwLock<Option<String>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load a key before the code under test runs.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.write().insert(key.into(), value.into());
    }

    /// Direct read-back for assertions.
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Keys currently present, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Make every subsequent read fail as a connection error.
    pub fn fail_reads(self, detail: impl Into<String>) -> Self {
        *self.read_failure.write() = Some(detail.into());
        self
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(self, detail: impl Into<String>) -> Self {
        *self.write_failure.write() = Some(detail.into());
        self
    }

    /// Session currently holding `key`, if any.
    pub fn lock_holder(&self, key: &str) -> Option<String> {
        self.locks.read().get(key).cloned()
    }
}

#[async_trait]
impl KvTransport for MemoryTransport {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(detail) = self.read_failure.read().clone() {
            return Err(StoreError::Connection { detail });
        }
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if let Some(detail) = self.write_failure.read().clone() {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                detail,
            });
        }
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn create_session(&self, _name: &str, _ttl: &str) -> StoreResult<String> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn destroy_session(&self, session: &str) -> StoreResult<()> {
        self.locks.write().retain(|_, holder| holder != session);
        Ok(())
    }

    async fn acquire(&self, key: &str, session: &str) -> StoreResult<bool> {
        let mut locks = self.locks.write();
        match locks.get(key) {
            Some(holder) if holder != session => Ok(false),
            _ => {
                locks.insert(key.to_string(), session.to_string());
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str, session: &str) -> StoreResult<bool> {
        let mut locks = self.locks.write();
        match locks.get(key) {
            Some(holder) if holder == session => {
                locks.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
