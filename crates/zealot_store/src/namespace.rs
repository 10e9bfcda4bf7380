//! Namespace prefixes for the two configuration domains.

use std::fmt;

/// Root prefix for application-level configuration (templates, shared
/// settings).
pub const APP_ROOT: &str = "appconfig";

/// Root prefix for per-run job configuration and run-derived state.
pub const JOB_ROOT: &str = "jobconfig";

/// Key under a namespace that holds the remote backend state.
const STATE_KEY: &str = "state";

/// Key under a namespace used as the run lock.
const LOCK_KEY: &str = ".lock";

/// A key prefix identifying one configuration domain for one resource.
///
/// All store reads and writes happen under a namespace; the two
/// constructors are the only way to build one, so a path like
/// `jobconfig/<app>/<name>/` can never be mistyped at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    base: String,
}

impl Namespace {
    /// Application-level namespace: `appconfig/<app>/`.
    pub fn app(app: &str) -> Self {
        Self {
            base: format!("{}/{}/", APP_ROOT, app),
        }
    }

    /// Job-level namespace for one named run: `jobconfig/<app>/<name>/`.
    pub fn job(app: &str, name: &str) -> Self {
        Self {
            base: format!("{}/{}/{}/", JOB_ROOT, app, name),
        }
    }

    /// The namespace prefix, trailing slash included.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full store key for `key` under this namespace.
    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.base, key)
    }

    /// Remote backend state location derived from this namespace.
    pub fn state_path(&self) -> String {
        self.key(STATE_KEY)
    }

    /// Lock key guarding runs against this namespace.
    pub fn lock_key(&self) -> String {
        self.key(LOCK_KEY)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}
