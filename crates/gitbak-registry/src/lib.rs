pub mod drift;
pub mod marker;

use std::collections::BTreeSet;
use std::sync::Mutex;

use gitbak_core::error::GitBakError;
use gitbak_core::models::repo::validate_repo_name;

pub use drift::{reconcile_with_filesystem, scan_repos_root, DriftReport};
pub use marker::MarkerDirRegistry;

/// The set of tracked repository names.
pub trait TrackingRegistry {
    /// All tracked names.
    fn list_tracked(&self) -> Result<BTreeSet<String>, GitBakError>;

    /// Track `name`. Returns `false` if it was already tracked.
    fn mark_tracked(&self, name: &str) -> Result<bool, GitBakError>;

    fn is_tracked(&self, name: &str) -> Result<bool, GitBakError> {
        Ok(self.list_tracked()?.contains(name))
    }
}

/// In-memory registry for testing.
pub struct MemoryRegistry {
    names: Mutex<BTreeSet<String>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            names: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(names.into_iter().map(Into::into).collect()),
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingRegistry for MemoryRegistry {
    fn list_tracked(&self) -> Result<BTreeSet<String>, GitBakError> {
        Ok(self.names.lock().unwrap().clone())
    }

    fn mark_tracked(&self, name: &str) -> Result<bool, GitBakError> {
        validate_repo_name(name)?;
        Ok(self.names.lock().unwrap().insert(name.to_string()))
    }
}
