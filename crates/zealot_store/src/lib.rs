//! # zealot_store
//!
//! Key-value store access for zealot runs.
//!
//! The backing store is the single source of configuration and the sink for
//! run-derived state. This crate provides:
//!
//! - **Transports**: [`HttpTransport`] against a live agent and
//!   [`MemoryTransport`] for tests and local development
//! - **Typed access**: [`NamespacedKv`], one generic accessor serving both
//!   the `appconfig/` and `jobconfig/` domains
//! - **Run locks**: [`ResourceLock`], a session-backed exclusive lock per
//!   resource namespace
//!
//! Accessors never terminate the process. Failures come back as
//! [`StoreError`] values carrying a fatal or recoverable classification
//! ([`StoreError::is_fatal`]); the decision to exit belongs to the
//! binary's top level alone.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zealot_store::{HttpTransport, Lookup, Namespace, NamespacedKv};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(HttpTransport::connect("127.0.0.1:8500").await?);
//!     let job = NamespacedKv::new(Namespace::job("zealot", "demo"), transport);
//!
//!     let workdir = job.get_string("WorkingDir", Lookup::Required).await?;
//!     println!("working dir: {}", workdir);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod lock;
pub mod memory;
pub mod namespace;
pub mod transport;

pub use client::{Lookup, NamespacedKv};
pub use error::{StoreError, StoreResult};
pub use http::HttpTransport;
pub use lock::ResourceLock;
pub use memory::MemoryTransport;
pub use namespace::{Namespace, APP_ROOT, JOB_ROOT};
pub use transport::KvTransport;
