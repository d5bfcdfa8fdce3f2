use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use gitbak_core::error::GitBakError;

/// Divergence between the tracked set and the repos root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    /// Tracked, but no directory under the repos root.
    pub tracked_but_missing: BTreeSet<String>,
    /// A directory under the repos root that is not tracked.
    pub present_but_untracked: BTreeSet<String>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.tracked_but_missing.is_empty() && self.present_but_untracked.is_empty()
    }
}

/// Compare tracked names with the directories actually present. Pure; never repairs.
pub fn reconcile_with_filesystem(
    tracked: &BTreeSet<String>,
    present: &BTreeSet<String>,
) -> DriftReport {
    DriftReport {
        tracked_but_missing: tracked.difference(present).cloned().collect(),
        present_but_untracked: present.difference(tracked).cloned().collect(),
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Non-hidden direct children of `dir`, optionally restricted to directories.
pub(crate) fn list_entries(dir: &Path, dirs_only: bool) -> Result<BTreeSet<String>, GitBakError> {
    let mut names = BTreeSet::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    for entry in walker {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => GitBakError::Io(io),
            None => GitBakError::Io(std::io::Error::other("filesystem loop")),
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            continue;
        }
        if dirs_only && !entry.file_type().is_dir() {
            continue;
        }
        names.insert(name);
    }
    Ok(names)
}

/// Names of the non-hidden directories directly under the repos root.
pub fn scan_repos_root(repos_root: &Path) -> Result<BTreeSet<String>, GitBakError> {
    list_entries(repos_root, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drift_scenario() {
        let report = reconcile_with_filesystem(&set(&["A", "B"]), &set(&["B", "C"]));
        assert_eq!(report.tracked_but_missing, set(&["A"]));
        assert_eq!(report.present_but_untracked, set(&["C"]));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_drift_sets_are_disjoint() {
        let tracked = set(&["a", "b", "c", "shared", "x"]);
        let present = set(&["shared", "x", "y", "z"]);
        let report = reconcile_with_filesystem(&tracked, &present);
        let both: BTreeSet<String> = tracked.intersection(&present).cloned().collect();

        assert!(report
            .tracked_but_missing
            .is_disjoint(&report.present_but_untracked));
        assert!(report.tracked_but_missing.is_disjoint(&both));
        assert!(report.present_but_untracked.is_disjoint(&both));

        // calling again gives the same answer
        assert_eq!(report, reconcile_with_filesystem(&tracked, &present));
    }

    #[test]
    fn test_clean_when_equal() {
        let names = set(&["a", "b"]);
        assert!(reconcile_with_filesystem(&names, &names).is_clean());
    }

    #[test]
    fn test_scan_skips_hidden_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("project")).unwrap();
        std::fs::create_dir(dir.path().join(".cache")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(scan_repos_root(dir.path()).unwrap(), set(&["project"]));
        assert_eq!(
            list_entries(dir.path(), false).unwrap(),
            set(&["notes.txt", "project"])
        );
    }

    #[test]
    fn test_scan_missing_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_repos_root(&dir.path().join("nope")).is_err());
    }
}
