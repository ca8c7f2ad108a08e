//! modsync-core: content-addressed synchronization engine
//!
//! Keeps a local game installation in line with a remote, versioned file
//! manifest: scan what exists, diff it against the manifest's object table,
//! delete stale tracked files, download changed objects with a bounded
//! worker pool, and commit the manifest as the new local baseline.

mod config;
mod download;
mod error;
mod fetch;
mod hash;
mod index;
mod manifest;
mod plan;
mod scan;
mod sync;

pub use config::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, SyncConfig};
pub use download::{DownloadTask, download_all};
pub use error::SyncError;
pub use fetch::{fetch_remote_manifests, find_package, object_url};
pub use hash::{hash_bytes, hash_file};
pub use index::LocalIndex;
pub use manifest::{ASSET_PREFIX, Namespace, PackageManifest, namespace_of, resolve_object_path};
pub use plan::{DiffPlan, compute_plan};
pub use scan::{collect_existing_keys, scan_local_state};
pub use sync::{SyncSummary, sync_package};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;
