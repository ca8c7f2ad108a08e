//! Sync orchestration: scan → plan → delete → download → commit

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use reqwest::Client;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::SyncConfig;
use crate::download::{self, DownloadTask};
use crate::index::LocalIndex;
use crate::manifest::{PackageManifest, resolve_object_path};
use crate::{Result, SyncError, fetch, plan, scan};

/// Counts from one completed sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub downloaded: usize,
    pub deleted: usize,
    pub preserved: usize,
}

/// Bring the local installation of one package in line with its manifest.
///
/// Phases run strictly in order: scan local state, compute the diff, delete
/// stale tracked files, download changed objects, and only then commit the
/// manifest to the local index. A failed download phase leaves the index
/// untouched; files fetched before the failure stay on disk and the next
/// pass re-derives the remaining work from the same diff.
pub async fn sync_package(
    client: &Client,
    config: &SyncConfig,
    manifest: &PackageManifest,
    force_overwrite: bool,
) -> Result<SyncSummary> {
    let package_dir = config.package_dir(&manifest.package_name);
    let assets_dir = config.assets_dir();

    // A forced resync also scans the no-overwrite paths, making their stale
    // entries visible to the planner like any other tracked file.
    let mut include = manifest.include.clone();
    if force_overwrite {
        include.extend(manifest.include_no_overwrite.iter().cloned());
    }
    let local = scan::scan_local_state(&package_dir, &assets_dir, &include)?;

    let exempt = if force_overwrite {
        BTreeSet::new()
    } else {
        scan::collect_existing_keys(&package_dir, &manifest.include_no_overwrite)?
    };

    let plan = plan::compute_plan(&local, &manifest.objects, exempt);
    info!(
        package = %manifest.package_name,
        downloads = plan.to_download.len(),
        deletions = plan.to_delete.len(),
        preserved = plan.no_overwrite_exempt.len(),
        "computed sync plan"
    );

    for key in &plan.to_delete {
        let path = resolve_object_path(key, &package_dir, &assets_dir);
        match fs::remove_file(&path) {
            Ok(()) => debug!(key, "deleted stale file"),
            // Already gone is success, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SyncError::io(path, e)),
        }
    }
    prune_empty_dirs(&package_dir);

    let tasks = plan
        .to_download
        .iter()
        .map(|key| DownloadTask {
            key: key.clone(),
            url: fetch::object_url(&config.server_base, &manifest.package_name, key),
            dest: resolve_object_path(key, &package_dir, &assets_dir),
        })
        .collect();
    download::download_all(client, &manifest.package_name, tasks, config).await?;

    LocalIndex::new(config.index_path()).upsert(manifest)?;

    Ok(SyncSummary {
        downloaded: plan.to_download.len(),
        deleted: plan.to_delete.len(),
        preserved: plan.no_overwrite_exempt.len(),
    })
}

/// Best-effort removal of directories left empty by the deletion phase.
/// Children are visited before parents, so an empty chain collapses in one
/// pass. The package root itself is kept.
fn prune_empty_dirs(root: &Path) {
    if !root.is_dir() {
        return;
    }
    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path == root || !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            let _ = fs::remove_dir(path);
        }
    }
}
