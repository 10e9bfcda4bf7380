//! HTTP transport against a Consul-compatible agent.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::transport::KvTransport;

/// Key-value transport speaking the agent's HTTP API.
///
/// Keys map onto `/v1/kv/<key>` and sessions onto `/v1/session/...`.
/// Reads use the raw endpoint, so stored bytes come back unencoded.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SessionCreated {
    #[serde(rename = "ID")]
    id: String,
}

impl HttpTransport {
    /// Connect to the store at `address` and probe that it is reachable.
    ///
    /// `address` may omit the scheme; `http://` is assumed. Any probe
    /// failure is reported as `StoreError::Connection`.
    pub async fn connect(address: &str) -> StoreResult<Self> {
        let transport = Self {
            base_url: normalize_address(address),
            client: reqwest::Client::new(),
        };
        transport.probe().await?;
        debug!("connected to store at {}", transport.base_url);
        Ok(transport)
    }

    /// Base URL the transport talks to.
    pub fn address(&self) -> &str {
        &self.base_url
    }

    async fn probe(&self) -> StoreResult<()> {
        let url = format!("{}/v1/status/leader", self.base_url);
        let response = self.client.get(&url).send().await.map_err(connection)?;
        if !response.status().is_success() {
            return Err(StoreError::Connection {
                detail: format!("status probe returned {}", response.status()),
            });
        }
        Ok(())
    }

    fn kv_url(&self, key: &str) -> String {
        format!("{}/v1/kv/{}", self.base_url, key)
    }

    async fn lock_op(&self, key: &str, op: &str, session: &str) -> StoreResult<bool> {
        let response = self
            .client
            .put(self.kv_url(key))
            .query(&[(op, session)])
            .send()
            .await
            .map_err(|e| StoreError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Session(format!(
                "lock {} returned {}",
                op,
                response.status()
            )));
        }
        // The agent answers with a bare "true" or "false" body.
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Session(e.to_string()))?;
        Ok(body.trim() == "true")
    }
}

fn normalize_address(address: &str) -> String {
    let with_scheme = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };
    with_scheme.trim_end_matches('/').to_string()
}

fn connection(err: reqwest::Error) -> StoreError {
    StoreError::Connection {
        detail: err.to_string(),
    }
}

#[async_trait]
impl KvTransport for HttpTransport {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(format!("{}?raw", self.kv_url(key)))
            .send()
            .await
            .map_err(connection)?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(connection)?;
                Ok(Some(body.to_vec()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Connection {
                detail: format!("read of '{}' returned {}", key, status),
            }),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let response = self
            .client
            .put(self.kv_url(key))
            .body(value.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                detail: format!("store returned {}", response.status()),
            });
        }
        Ok(())
    }

    async fn create_session(&self, name: &str, ttl: &str) -> StoreResult<String> {
        let url = format!("{}/v1/session/create", self.base_url);
        let body = serde_json::json!({
            "Name": name,
            "TTL": ttl,
            "Behavior": "delete",
        });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Session(format!(
                "session create returned {}",
                response.status()
            )));
        }
        let created: SessionCreated = response
            .json()
            .await
            .map_err(|e| StoreError::Session(e.to_string()))?;
        Ok(created.id)
    }

    async fn destroy_session(&self, session: &str) -> StoreResult<()> {
        let url = format!("{}/v1/session/destroy/{}", self.base_url, session);
        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| StoreError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Session(format!(
                "session destroy returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn acquire(&self, key: &str, session: &str) -> StoreResult<bool> {
        self.lock_op(key, "acquire", session).await
    }

    async fn release(&self, key: &str, session: &str) -> StoreResult<bool> {
        self.lock_op(key, "release", session).await
    }
}
