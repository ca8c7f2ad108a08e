//! Persisted local index: the last manifest successfully applied per package
//!
//! One JSON document holding an array of manifests. Each save rewrites the
//! whole document atomically; this is not an append log.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::manifest::PackageManifest;
use crate::{Result, SyncError};

/// Handle to the persisted index file.
#[derive(Debug, Clone)]
pub struct LocalIndex {
    path: PathBuf,
}

impl LocalIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all known package manifests. A missing file or malformed
    /// content degrades to an empty index; offline operation must never
    /// fail on a corrupt cache.
    pub fn load(&self) -> Vec<PackageManifest> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&data) {
            Ok(manifests) => manifests,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "local index malformed, treating as empty");
                Vec::new()
            }
        }
    }

    /// The last-applied manifest for one package, if any.
    pub fn get(&self, package_name: &str) -> Option<PackageManifest> {
        self.load()
            .into_iter()
            .find(|m| m.package_name == package_name)
    }

    /// Replace the entry for this manifest's package, keeping all others,
    /// and rewrite the document atomically.
    pub fn upsert(&self, manifest: &PackageManifest) -> Result<()> {
        let mut manifests = self.load();
        manifests.retain(|m| m.package_name != manifest.package_name);
        manifests.push(manifest.clone());

        let data = serde_json::to_string_pretty(&manifests)
            .map_err(|e| SyncError::io(&self.path, std::io::Error::other(e)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| SyncError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SyncError::io(&self.path, e))?;

        debug!(package = %manifest.package_name, path = %self.path.display(), "local index updated");
        Ok(())
    }
}
