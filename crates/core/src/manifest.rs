//! Manifest types describing one distributable package
//!
//! A manifest is produced by the remote build pipeline, fetched read-only,
//! and never mutated locally; a sync replaces the stored copy wholesale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Prefix marking an object key as belonging to the shared asset store.
pub const ASSET_PREFIX: &str = "assets/";

/// Description of one distributable package and its object table.
///
/// The runtime fields (`runtime_version`, `main_class`, argument lists,
/// `libraries`, `client_filename`) are carried opaquely for the launch
/// layer; the sync engine only reads `include`, `include_no_overwrite`
/// and `objects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub package_name: String,
    pub runtime_version: String,
    pub game_version: String,
    pub package_version: String,
    pub asset_index: String,
    pub main_class: String,
    pub libraries: Vec<serde_json::Value>,
    pub runtime_args: Vec<serde_json::Value>,
    pub game_args: Vec<serde_json::Value>,
    /// Paths (files or directories) tracked by the sync engine, relative to
    /// the package directory, forward slashes only.
    pub include: Vec<String>,
    /// Tracked paths whose local copies are user-editable and preserved
    /// across syncs unless a forced resync is requested.
    pub include_no_overwrite: Vec<String>,
    /// Object key → hex content hash.
    pub objects: HashMap<String, String>,
    pub client_filename: String,
}

/// Which on-disk root an object key resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Relative to the package directory; eligible for deletion when absent
    /// from the manifest.
    Tracked,
    /// Relative to the shared asset store; shared across packages and never
    /// deleted by the sync engine.
    Asset,
}

/// Classify an object key by its namespace prefix.
pub fn namespace_of(key: &str) -> Namespace {
    if key.starts_with(ASSET_PREFIX) {
        Namespace::Asset
    } else {
        Namespace::Tracked
    }
}

/// Resolve an object key to its destination path.
///
/// Asset keys strip their `assets/` prefix and resolve against the shared
/// asset store; everything else resolves against the package directory.
/// Keys use forward slashes; components are joined so the result uses
/// platform separators.
pub fn resolve_object_path(key: &str, package_dir: &Path, assets_dir: &Path) -> PathBuf {
    match key.strip_prefix(ASSET_PREFIX) {
        Some(rest) => join_key(assets_dir, rest),
        None => join_key(package_dir, key),
    }
}

pub(crate) fn join_key(root: &Path, key: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in key.split('/').filter(|c| !c.is_empty()) {
        path.push(component);
    }
    path
}
