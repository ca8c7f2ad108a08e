//! Engine configuration and on-disk layout
//!
//! All tunables live in one validated struct that is threaded through the
//! orchestrator explicitly. Layout:
//!
//! ```text
//! <data_dir>/
//! ├── packages/<package_name>/  # tracked files, one tree per package
//! ├── assets/                   # shared asset store, common to all packages
//! └── index.json                # last-applied manifest per package
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::{Result, SyncError};

/// Default number of concurrent download workers.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default retry budget per object download.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default base unit for the linear retry backoff (delay = attempt × unit).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Validated engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the package server, without a trailing slash.
    pub server_base: String,
    /// Root of the per-user data tree.
    pub data_dir: PathBuf,
    /// Number of concurrent download workers.
    pub concurrency: usize,
    /// Attempts per object before a transient failure becomes fatal.
    pub max_attempts: u32,
    /// Base unit for the linear backoff between attempts.
    pub retry_delay: Duration,
}

impl SyncConfig {
    /// Create a configuration with default tunables.
    ///
    /// `server_base` must be an http(s) URL; a trailing slash is trimmed so
    /// URL construction can join with `/` unconditionally.
    pub fn new(server_base: &str, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let server_base = server_base.trim_end_matches('/');
        if server_base.is_empty() {
            return Err(SyncError::InvalidConfig(
                "server base URL must not be empty".to_string(),
            ));
        }
        if !server_base.starts_with("http://") && !server_base.starts_with("https://") {
            return Err(SyncError::InvalidConfig(format!(
                "server base URL must be http(s), got '{server_base}'"
            )));
        }

        Ok(Self {
            server_base: server_base.to_string(),
            data_dir: data_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Default per-user data directory for this platform.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modsync")
    }

    /// Directory holding one package's tracked files.
    pub fn package_dir(&self, package_name: &str) -> PathBuf {
        self.data_dir.join("packages").join(package_name)
    }

    /// The shared asset store, common to all packages.
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    /// Location of the persisted local index.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index.json")
    }
}
