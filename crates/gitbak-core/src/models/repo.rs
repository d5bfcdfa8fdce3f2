use std::path::PathBuf;

use crate::error::GitBakError;

/// A repository under the repos root, identified by its directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalRepo {
    pub name: String,
    pub path: PathBuf,
}

impl std::fmt::Display for LocalRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A repo name must be a single, non-hidden path component.
pub fn validate_repo_name(name: &str) -> Result<(), GitBakError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else if name.contains('/') || name.contains('\\') {
        Some("name must not contain path separators")
    } else if name.ends_with(".git") {
        Some("name must not end with .git")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GitBakError::InvalidRepoName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo_name() {
        assert!(validate_repo_name("dotfiles").is_ok());
        assert!(validate_repo_name("my-project_2").is_ok());
        for bad in ["", ".hidden", "..", "a/b", "x.git"] {
            assert!(validate_repo_name(bad).is_err(), "accepted {bad:?}");
        }
    }
}
