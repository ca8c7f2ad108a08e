//! Error types for modsync-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a sync pass.
///
/// Local index corruption is deliberately absent: a malformed persisted
/// index degrades to an empty one and is never surfaced to callers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching or decoding the remote manifest list failed.
    #[error("failed to fetch manifest list from '{url}': {source}")]
    ManifestFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The requested package is not present in the remote manifest list.
    #[error("package '{0}' is not present in the remote manifest list")]
    PackageNotFound(String),

    /// A transient transport failure survived the whole retry budget.
    #[error("download of '{key}' for package '{package}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        package: String,
        key: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// A non-transient transport failure (e.g. 4xx) during an object fetch.
    #[error("download of '{key}' failed: {source}")]
    Download {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    /// Filesystem failure while scanning, deleting, writing, or persisting.
    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Whether the caller can fall back to the local index: the manifest
    /// could not be obtained at all, as opposed to a sync that started and
    /// failed partway.
    pub fn is_manifest_unavailable(&self) -> bool {
        matches!(
            self,
            SyncError::ManifestFetch { .. } | SyncError::PackageNotFound(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_not_found_is_manifest_unavailable() {
        let err = SyncError::PackageNotFound("vanilla-plus".to_string());
        assert!(err.is_manifest_unavailable());
    }

    #[test]
    fn io_error_is_not_manifest_unavailable() {
        let err = SyncError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_manifest_unavailable());
    }
}
