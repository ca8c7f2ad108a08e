//! Diff planning between local state and a manifest object table

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::manifest::{Namespace, namespace_of};

/// The actions one sync pass will take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPlan {
    /// Tracked keys present locally but absent from the manifest.
    pub to_delete: BTreeSet<String>,
    /// Manifest keys that are missing locally or whose hash differs.
    pub to_download: BTreeSet<String>,
    /// Keys under a no-overwrite path that already exist locally; left
    /// untouched by both the download and the deletion phase.
    pub no_overwrite_exempt: BTreeSet<String>,
}

impl DiffPlan {
    /// Whether the pass has any work to do.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_download.is_empty()
    }
}

/// Compare scanned local state against the manifest object table.
///
/// `exempt` is the set of keys protected from overwrite, as computed by the
/// caller from `include_no_overwrite` (empty when force-overwrite is
/// requested). Exemption wins over both download and deletion: a key listed
/// under an included path and a no-overwrite path stays exempt, and an
/// exempt key absent from the manifest is preserved rather than deleted.
/// Asset-namespace keys are never deleted; shared asset lifetime is managed
/// outside this engine.
pub fn compute_plan(
    local: &BTreeMap<String, String>,
    objects: &HashMap<String, String>,
    exempt: BTreeSet<String>,
) -> DiffPlan {
    let to_delete = local
        .keys()
        .filter(|key| namespace_of(key) == Namespace::Tracked)
        .filter(|key| !objects.contains_key(*key))
        .filter(|key| !exempt.contains(*key))
        .cloned()
        .collect();

    let to_download = objects
        .iter()
        .filter(|(key, _)| !exempt.contains(*key))
        .filter(|(key, remote_hash)| local.get(*key) != Some(*remote_hash))
        .map(|(key, _)| key.clone())
        .collect();

    DiffPlan {
        to_delete,
        to_download,
        no_overwrite_exempt: exempt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn objects(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn exempt(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn downloads_only_missing_or_changed_objects() {
        let plan = compute_plan(
            &local(&[("mods/a.jar", "h1")]),
            &objects(&[("mods/a.jar", "h1"), ("config/x.toml", "h2")]),
            BTreeSet::new(),
        );

        assert_eq!(plan.to_download, exempt(&["config/x.toml"]));
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn changed_hash_triggers_download() {
        let plan = compute_plan(
            &local(&[("mods/a.jar", "old")]),
            &objects(&[("mods/a.jar", "new")]),
            BTreeSet::new(),
        );
        assert_eq!(plan.to_download, exempt(&["mods/a.jar"]));
    }

    #[test]
    fn stale_tracked_file_is_deleted() {
        let plan = compute_plan(
            &local(&[("mods/old.jar", "h9")]),
            &objects(&[("mods/a.jar", "h1")]),
            BTreeSet::new(),
        );
        assert_eq!(plan.to_delete, exempt(&["mods/old.jar"]));
    }

    #[test]
    fn asset_entries_are_never_deleted() {
        let plan = compute_plan(
            &local(&[("assets/objects/00/0011", "h9")]),
            &objects(&[]),
            BTreeSet::new(),
        );
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn exempt_key_is_not_downloaded() {
        let plan = compute_plan(
            &local(&[("config/user/keys.toml", "local-edit")]),
            &objects(&[("config/user/keys.toml", "upstream")]),
            exempt(&["config/user/keys.toml"]),
        );

        assert!(plan.to_download.is_empty());
        assert!(plan.to_download.is_disjoint(&plan.no_overwrite_exempt));
    }

    #[test]
    fn exempt_key_missing_from_manifest_is_not_deleted() {
        let plan = compute_plan(
            &local(&[("config/user/extra.toml", "h1")]),
            &objects(&[]),
            exempt(&["config/user/extra.toml"]),
        );
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn force_overwrite_passes_an_empty_exemption_set() {
        let plan = compute_plan(
            &local(&[("config/user/keys.toml", "local-edit")]),
            &objects(&[("config/user/keys.toml", "upstream")]),
            BTreeSet::new(),
        );
        assert_eq!(plan.to_download, exempt(&["config/user/keys.toml"]));
    }

    #[test]
    fn missing_exempt_key_is_still_downloaded_when_not_on_disk() {
        // Exemption only covers keys that exist locally; the caller computes
        // the set from on-disk files, so an absent no-overwrite file is
        // fetched like any other object.
        let plan = compute_plan(
            &local(&[]),
            &objects(&[("config/user/keys.toml", "upstream")]),
            BTreeSet::new(),
        );
        assert_eq!(plan.to_download, exempt(&["config/user/keys.toml"]));
    }
}
