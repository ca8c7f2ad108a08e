//! Bounded-concurrency download executor
//!
//! A fixed pool of worker futures drains a single shared pending set of
//! download tasks. Workers and the progress reporter are joined in one
//! task rather than spawned, so the first fatal error drops and thereby
//! cancels every sibling; no worker takes new keys after a failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use reqwest::Client;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::{Result, SyncError};

/// How often the progress reporter samples the pending set.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// One object to fetch. Created once per planned download; a retry reuses
/// the same task record, it is never re-queued as a duplicate.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub key: String,
    pub url: String,
    pub dest: PathBuf,
}

/// Drain `tasks` with `config.concurrency` workers, retrying transient
/// transport failures per task up to `config.max_attempts` with linearly
/// increasing delay. Returns on the first fatal error, cancelling all
/// in-flight workers.
pub async fn download_all(
    client: &Client,
    package_name: &str,
    tasks: Vec<DownloadTask>,
    config: &SyncConfig,
) -> Result<()> {
    if tasks.is_empty() {
        return Ok(());
    }

    let total = tasks.len();
    info!(package = package_name, total, "starting downloads");
    let pending = Arc::new(Mutex::new(tasks));

    let mut jobs: Vec<BoxFuture<'_, Result<()>>> = Vec::new();
    jobs.push(report_progress(Arc::clone(&pending), total).boxed());
    for _ in 0..config.concurrency.max(1) {
        jobs.push(worker(client, package_name, Arc::clone(&pending), config).boxed());
    }

    try_join_all(jobs).await?;
    info!(package = package_name, total, "downloads complete");
    Ok(())
}

async fn worker(
    client: &Client,
    package_name: &str,
    pending: Arc<Mutex<Vec<DownloadTask>>>,
    config: &SyncConfig,
) -> Result<()> {
    loop {
        // The single consume point: pop under the lock, release it before
        // any network I/O so siblings keep draining.
        let task = pending.lock().await.pop();
        let Some(task) = task else {
            return Ok(());
        };
        download_task(client, package_name, &task, config).await?;
    }
}

async fn download_task(
    client: &Client,
    package_name: &str,
    task: &DownloadTask,
    config: &SyncConfig,
) -> Result<()> {
    let mut attempt = 1u32;
    let bytes = loop {
        match fetch_object(client, &task.url).await {
            Ok(bytes) => break bytes,
            Err(e) if !is_transient(&e) => {
                return Err(SyncError::Download {
                    key: task.key.clone(),
                    source: e,
                });
            }
            Err(e) if attempt >= config.max_attempts => {
                return Err(SyncError::RetriesExhausted {
                    package: package_name.to_string(),
                    key: task.key.clone(),
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                warn!(key = %task.key, attempt, error = %e, "transient download failure, retrying");
                sleep(config.retry_delay * attempt).await;
                attempt += 1;
            }
        }
    };

    write_atomic(&task.dest, &bytes).await
}

async fn fetch_object(client: &Client, url: &str) -> std::result::Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Connection-level failures and server errors are worth retrying; any
/// response the server meant (4xx) and local request-building mistakes are
/// not.
fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_builder() {
        return false;
    }
    match err.status() {
        Some(status) => status.is_server_error(),
        // No HTTP status: connection refused/reset, timeout, interrupted body.
        None => true,
    }
}

/// Write to a `.part` sibling and rename into place, so an aborted fetch
/// never leaves a valid-looking destination file.
async fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
    }

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dest.with_file_name(format!("{file_name}.part"));

    fs::write(&tmp, bytes)
        .await
        .map_err(|e| SyncError::io(&tmp, e))?;
    fs::rename(&tmp, dest)
        .await
        .map_err(|e| SyncError::io(dest, e))?;
    Ok(())
}

async fn report_progress(pending: Arc<Mutex<Vec<DownloadTask>>>, total: usize) -> Result<()> {
    loop {
        let left = pending.lock().await.len();
        if left == 0 {
            return Ok(());
        }
        info!(done = total - left, total, "download progress");
        sleep(PROGRESS_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn write_atomic_creates_parents_and_leaves_no_part_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("mods/sub/a.jar");

        write_atomic(&dest, b"jar bytes").await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jar bytes");
        assert!(!temp.path().join("mods/sub/a.jar.part").exists());
    }

    #[tokio::test]
    async fn write_atomic_replaces_existing_content() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a.jar");
        std::fs::write(&dest, "old").unwrap();

        write_atomic(&dest, b"new").await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
