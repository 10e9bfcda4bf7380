//! Per-resource run lock over the store's session primitives.

use std::sync::Arc;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::namespace::Namespace;
use crate::transport::KvTransport;

/// TTL after which an abandoned run's session, and with it the lock,
/// expires on its own.
const SESSION_TTL: &str = "60s";

/// Exclusive lock guarding one resource namespace for the span of a run.
///
/// Acquisition is try-once: contention surfaces immediately as
/// `StoreError::LockHeld` with no waiting or retry. The lock key is
/// `<namespace>.lock` and is backed by a store session, so a crashed
/// holder loses the lock when the session TTL lapses.
pub struct ResourceLock {
    transport: Arc<dyn KvTransport>,
    key: String,
    name: String,
    session: Option<String>,
}

impl ResourceLock {
    pub fn new(namespace: &Namespace, transport: Arc<dyn KvTransport>) -> Self {
        Self {
            key: namespace.lock_key(),
            name: format!("zealot:{}", namespace.base()),
            transport,
            session: None,
        }
    }

    /// Whether this handle currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.session.is_some()
    }

    /// Lock key guarded by this handle.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Acquire the lock, failing immediately when another run holds it.
    pub async fn acquire(&mut self) -> StoreResult<()> {
        let session = self.transport.create_session(&self.name, SESSION_TTL).await?;
        if self.transport.acquire(&self.key, &session).await? {
            debug!("acquired lock '{}'", self.key);
            self.session = Some(session);
            return Ok(());
        }
        // The session holds nothing; drop it rather than leak it until TTL.
        let _ = self.transport.destroy_session(&session).await;
        Err(StoreError::LockHeld {
            key: self.key.clone(),
        })
    }

    /// Release the lock and destroy its session. No-op when not held.
    pub async fn release(&mut self) -> StoreResult<()> {
        if let Some(session) = self.session.take() {
            self.transport.release(&self.key, &session).await?;
            self.transport.destroy_session(&session).await?;
            debug!("released lock '{}'", self.key);
        }
        Ok(())
    }
}
