//! Remote manifest fetch and object URL construction

use reqwest::Client;
use tracing::{debug, info};

use crate::manifest::PackageManifest;
use crate::{Result, SyncError};

/// Fetch the manifest list from `{server_base}/index.json`.
///
/// A transport failure and an unparseable document are both fatal here:
/// the engine never operates on a partially-decoded remote contract.
pub async fn fetch_remote_manifests(
    client: &Client,
    server_base: &str,
) -> Result<Vec<PackageManifest>> {
    let url = format!("{server_base}/index.json");
    info!(url, "fetching manifest list");

    let manifests = client
        .get(&url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| SyncError::ManifestFetch {
            url: url.clone(),
            source: e,
        })?
        .json::<Vec<PackageManifest>>()
        .await
        .map_err(|e| SyncError::ManifestFetch { url, source: e })?;

    debug!(count = manifests.len(), "decoded manifest list");
    Ok(manifests)
}

/// Select one package from a fetched manifest list.
pub fn find_package(
    manifests: Vec<PackageManifest>,
    package_name: &str,
) -> Result<PackageManifest> {
    manifests
        .into_iter()
        .find(|m| m.package_name == package_name)
        .ok_or_else(|| SyncError::PackageNotFound(package_name.to_string()))
}

/// URL an object is fetched from. Asset keys keep their `assets/` prefix on
/// the wire; the prefix only affects where the bytes land on disk.
pub fn object_url(server_base: &str, package_name: &str, key: &str) -> String {
    format!("{server_base}/{package_name}/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_named(name: &str) -> PackageManifest {
        serde_json::from_value(serde_json::json!({
            "package_name": name,
            "runtime_version": "17",
            "game_version": "1.19.2",
            "package_version": "1",
            "asset_index": "1.19",
            "main_class": "Main",
            "libraries": [],
            "runtime_args": [],
            "game_args": [],
            "include": [],
            "include_no_overwrite": [],
            "objects": {},
            "client_filename": "client.jar"
        }))
        .unwrap()
    }

    #[test]
    fn find_package_selects_by_name() {
        let manifests = vec![manifest_named("alpha"), manifest_named("beta")];
        let found = find_package(manifests, "beta").unwrap();
        assert_eq!(found.package_name, "beta");
    }

    #[test]
    fn find_package_missing_is_not_found() {
        let err = find_package(vec![manifest_named("alpha")], "gamma").unwrap_err();
        assert!(matches!(err, SyncError::PackageNotFound(name) if name == "gamma"));
    }

    #[test]
    fn object_url_keeps_asset_prefix() {
        assert_eq!(
            object_url("http://host", "pack", "assets/objects/00/0011"),
            "http://host/pack/assets/objects/00/0011"
        );
    }
}
