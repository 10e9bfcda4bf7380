//! Typed, namespaced access over any transport.

use std::sync::Arc;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::namespace::Namespace;
use crate::transport::KvTransport;

/// How a missing key is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Absence is `StoreError::MissingRequired`; the run cannot proceed
    /// without the value.
    Required,
    /// Absence is `StoreError::NotFound`; the caller decides what that
    /// means.
    Optional,
}

/// Typed accessor for one namespace of the store.
///
/// The same accessor serves both configuration domains; construct it over
/// `Namespace::app` or `Namespace::job`. Values are opaque bytes in the
/// store and the getters decode them on the way out. Accessors never
/// terminate the process: every failure is returned as a classified
/// `StoreError` for the top level to act on.
#[derive(Clone)]
pub struct NamespacedKv {
    namespace: Namespace,
    transport: Arc<dyn KvTransport>,
}

impl NamespacedKv {
    pub fn new(namespace: Namespace, transport: Arc<dyn KvTransport>) -> Self {
        Self {
            namespace,
            transport,
        }
    }

    /// Namespace this accessor reads and writes under.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The namespace prefix.
    pub fn base(&self) -> &str {
        self.namespace.base()
    }

    /// Remote backend state location derived from the namespace.
    pub fn state_path(&self) -> String {
        self.namespace.state_path()
    }

    async fn fetch(&self, key: &str, lookup: Lookup) -> StoreResult<Vec<u8>> {
        let full = self.namespace.key(key);
        match self.transport.get(&full).await? {
            Some(value) => Ok(value),
            None => {
                debug!("key '{}' not present", full);
                Err(match lookup {
                    Lookup::Required => StoreError::MissingRequired { key: full },
                    Lookup::Optional => StoreError::NotFound { key: full },
                })
            }
        }
    }

    /// Raw bytes stored at `key`.
    pub async fn get_bytes(&self, key: &str, lookup: Lookup) -> StoreResult<Vec<u8>> {
        self.fetch(key, lookup).await
    }

    /// UTF-8 string stored at `key`.
    pub async fn get_string(&self, key: &str, lookup: Lookup) -> StoreResult<String> {
        let bytes = self.fetch(key, lookup).await?;
        String::from_utf8(bytes).map_err(|e| StoreError::Decode {
            key: self.namespace.key(key),
            expected: "string",
            detail: e.to_string(),
        })
    }

    /// Integer stored at `key`. The whole value must parse; trailing
    /// garbage is a decode error, not a truncation.
    pub async fn get_integer(&self, key: &str, lookup: Lookup) -> StoreResult<i64> {
        let text = self.get_string(key, lookup).await?;
        text.parse::<i64>().map_err(|e| StoreError::Decode {
            key: self.namespace.key(key),
            expected: "integer",
            detail: e.to_string(),
        })
    }

    /// Boolean stored at `key`.
    ///
    /// True iff the stored bytes are exactly `true` or `True`; any other
    /// value, including `TRUE` or `1`, reads as false.
    pub async fn get_bool(&self, key: &str, lookup: Lookup) -> StoreResult<bool> {
        let bytes = self.fetch(key, lookup).await?;
        Ok(matches!(bytes.as_slice(), b"true" | b"True"))
    }

    /// Write a string value under `key`.
    pub async fn set_value(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_bytes(key, value.as_bytes()).await
    }

    /// Write raw bytes under `key`.
    pub async fn set_bytes(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let full = self.namespace.key(key);
        self.transport.put(&full, value).await?;
        debug!("wrote {} bytes to '{}'", value.len(), full);
        Ok(())
    }
}
