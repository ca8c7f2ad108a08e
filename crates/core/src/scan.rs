//! Local state scanner
//!
//! Walks the tracked paths of a package directory plus the shared asset
//! store and produces a map of object key → content hash for every regular
//! file found. Symlinks are not followed and never hashed, so a link cycle
//! cannot trap the scan and a link target outside the tree is never read.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::manifest::{ASSET_PREFIX, join_key};
use crate::{Result, SyncError, hash};

/// Hash every regular file reachable from `include` entries under the
/// package directory, plus every file in the asset store (asset entries are
/// shared across packages and always scanned in full). Include entries may
/// name a single file or a directory; entries that do not exist on disk are
/// skipped. Keys are normalized forward-slash paths, asset keys prefixed
/// with `assets/`.
pub fn scan_local_state(
    package_dir: &Path,
    assets_dir: &Path,
    include: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut state = BTreeMap::new();

    for key in collect_existing_keys(package_dir, include)? {
        let path = join_key(package_dir, &key);
        let digest = hash::hash_file(&path)?;
        state.insert(key, digest);
    }

    for rel in walk_files(assets_dir, assets_dir)? {
        let path = join_key(assets_dir, &rel);
        let digest = hash::hash_file(&path)?;
        state.insert(format!("{ASSET_PREFIX}{rel}"), digest);
    }

    debug!(entries = state.len(), "scanned local state");
    Ok(state)
}

/// Enumerate the object keys of files that currently exist under the given
/// package-relative paths, without hashing them. Used to compute the
/// no-overwrite exemption set, where only existence matters.
pub fn collect_existing_keys(package_dir: &Path, paths: &[String]) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();

    for entry in paths {
        let path = join_key(package_dir, entry);
        if path.is_file() {
            keys.insert(normalize_key(entry));
        } else if path.is_dir() {
            keys.extend(walk_files(package_dir, &path)?);
        }
        // Neither a file nor a directory: nothing on disk yet, skip.
    }

    Ok(keys)
}

/// Recursively list regular files under `dir` as forward-slash keys
/// relative to `root`. Directories and symlinks are excluded.
fn walk_files(root: &Path, dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(io) => SyncError::io(path, io),
                None => SyncError::io(dir, std::io::Error::other("filesystem loop")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("walked entry is under its root");
        files.push(path_to_key(rel));
    }

    Ok(files)
}

/// Forward-slash key from a relative path, independent of the platform
/// separator.
fn path_to_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_key(entry: &str) -> String {
    entry
        .split('/')
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
