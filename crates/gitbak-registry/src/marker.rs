use std::collections::BTreeSet;
use std::fs::File;

use gitbak_core::error::GitBakError;
use gitbak_core::layout::{Layout, TRACKED_REPOS_DIR_NAME, TRACKING_REPO_NAME};
use gitbak_core::models::repo::validate_repo_name;
use gitbak_git::Vcs;

use crate::drift::list_entries;
use crate::TrackingRegistry;

/// Registry stored as zero-byte marker files in `tracked-repos/` of the tracking repo.
///
/// New markers are committed to the tracking repo, which is itself tracked and therefore
/// pushed along with every other repo.
pub struct MarkerDirRegistry<'a> {
    layout: Layout,
    vcs: &'a dyn Vcs,
}

impl<'a> MarkerDirRegistry<'a> {
    /// Open an initialised registry.
    pub fn open(layout: &Layout, vcs: &'a dyn Vcs) -> Result<Self, GitBakError> {
        let tracking = layout.tracking_repo_path();
        if !tracking.is_dir() {
            return Err(GitBakError::NotInitialized {
                message: format!(
                    "tracking repository {} does not exist; clone it or run `git-backup init`",
                    tracking.display()
                ),
            });
        }
        if !vcs.is_work_tree(&tracking) {
            return Err(GitBakError::NotInitialized {
                message: format!(
                    "{} exists but is not a git repository; if initialisation was interrupted, \
                     run `git-backup init --resume`",
                    tracking.display()
                ),
            });
        }
        if !layout.tracked_dir().is_dir() {
            return Err(GitBakError::NotInitialized {
                message: format!("{} is missing", layout.tracked_dir().display()),
            });
        }
        if !layout.tracked_dir().join(TRACKING_REPO_NAME).exists() {
            tracing::warn!("tracking repo does not track itself; it will not be pushed by `push`");
        }

        Ok(Self {
            layout: layout.clone(),
            vcs,
        })
    }

    /// Lay out `tracked-repos/` with the self marker inside a fresh tracking directory.
    /// Committing is left to the caller.
    pub fn create(layout: &Layout, vcs: &'a dyn Vcs) -> Result<Self, GitBakError> {
        std::fs::create_dir_all(layout.tracked_dir())?;
        File::create(layout.tracked_dir().join(TRACKING_REPO_NAME))?;
        Ok(Self {
            layout: layout.clone(),
            vcs,
        })
    }
}

impl MarkerDirRegistry<'_> {
    fn commit_marker(&self, name: &str) -> Result<(), GitBakError> {
        let tracking = self.layout.tracking_repo_path();
        self.vcs
            .add(&tracking, &format!("{TRACKED_REPOS_DIR_NAME}/{name}"))?;
        self.vcs.commit(&tracking, &format!("Track {name}"))
    }
}

impl TrackingRegistry for MarkerDirRegistry<'_> {
    fn list_tracked(&self) -> Result<BTreeSet<String>, GitBakError> {
        let dir = self.layout.tracked_dir();
        if !dir.is_dir() {
            return Err(GitBakError::NotInitialized {
                message: format!("{} is missing", dir.display()),
            });
        }
        list_entries(&dir, false)
    }

    fn mark_tracked(&self, name: &str) -> Result<bool, GitBakError> {
        validate_repo_name(name)?;
        let marker = self.layout.tracked_dir().join(name);
        if marker.exists() {
            return Ok(false);
        }
        File::create(&marker)?;

        // an uncommitted marker would read as tracked on the next attempt
        if let Err(e) = self.commit_marker(name) {
            if let Err(rm) = std::fs::remove_file(&marker) {
                tracing::warn!("could not remove {}: {rm}", marker.display());
            }
            return Err(e);
        }
        tracing::info!("now tracking {name}");
        Ok(true)
    }
}
