use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

use crate::error::GitBakError;
use crate::models::remote::HOSTED_REMOTE_NAME;

/// Template written by `init` for the user to edit.
pub const DEFAULT_CONFIG_TEMPLATE: &str = "\
# If set to true, GitHub will be included as a remote by calling out to the gh CLI tool.
# You will be asked whether to add a given repo to GitHub, and to choose its visibility.
# The gh tool must be installed and authenticated for this to work.
gh: false
# One or more SSH remotes, e.g.
# ssh_remotes:
#  - example.com
# Unlike gh, these remotes are used for every repo you create.
ssh_remotes: []
# Change this to true when you are happy with your config.
config_is_ready: false
";

/// User configuration, stored as `config.yaml` inside the tracking repo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupConfig {
    /// Whether a hosted-service (`gh`) remote is part of the desired remote set.
    #[serde(rename = "gh")]
    pub enable_hosted_remote: bool,

    /// SSH hosts, in order. Each one becomes a remote named after the host.
    #[serde(rename = "ssh_remotes")]
    pub ssh_remote_hosts: Vec<String>,

    /// Set by the user once the config has been reviewed.
    #[serde(rename = "config_is_ready")]
    pub config_confirmed: bool,
}

impl BackupConfig {
    /// Load and validate the config at `path`.
    pub fn load_from(path: &Path) -> Result<Self, GitBakError> {
        if !path.is_file() {
            return Err(GitBakError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config =
            Self::from_yaml_str(&content).map_err(|message| GitBakError::ConfigInvalid {
                path: path.to_path_buf(),
                message,
            })?;
        tracing::debug!(
            "loaded config from {}: gh={}, ssh_remotes={:?}",
            path.display(),
            config.enable_hosted_remote,
            config.ssh_remote_hosts
        );
        Ok(config)
    }

    /// Parse a YAML document, checking it against the schema before deserializing.
    pub fn from_yaml_str(content: &str) -> Result<Self, String> {
        let mut value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        normalize_legacy_bools(&mut value);
        validate(&value)?;
        serde_yaml::from_value(value).map_err(|e| e.to_string())
    }

    /// Write the commented template for first-time setup.
    pub fn write_template(path: &Path) -> Result<(), GitBakError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(())
    }
}

/// Boolean spellings from YAML 1.1 (`yes`, `No`, `ON`, ...) that serde_yaml reads as strings.
const LEGACY_BOOLS: &[(&str, bool)] = &[
    ("yes", true),
    ("Yes", true),
    ("YES", true),
    ("on", true),
    ("On", true),
    ("ON", true),
    ("no", false),
    ("No", false),
    ("NO", false),
    ("off", false),
    ("Off", false),
    ("OFF", false),
];

/// Rewrite YAML 1.1 boolean spellings of the boolean fields so older configs keep loading.
fn normalize_legacy_bools(value: &mut Value) {
    let Some(map) = value.as_mapping_mut() else {
        return;
    };
    for key in ["gh", "config_is_ready"] {
        if let Some(field) = map.get_mut(key) {
            let legacy = field
                .as_str()
                .and_then(|s| LEGACY_BOOLS.iter().find(|(name, _)| *name == s))
                .map(|(_, b)| *b);
            if let Some(b) = legacy {
                *field = Value::Bool(b);
            }
        }
    }
}

/// Structural schema check: the three fields are required, unknown fields are ignored.
pub fn validate(value: &Value) -> Result<(), String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| "config must be a mapping".to_string())?;

    let field = |name: &str| {
        map.get(name)
            .ok_or_else(|| format!("missing required field `{name}`"))
    };

    if !field("gh")?.is_bool() {
        return Err("`gh` must be a boolean".into());
    }
    if !field("config_is_ready")?.is_bool() {
        return Err("`config_is_ready` must be a boolean".into());
    }

    let hosts = field("ssh_remotes")?
        .as_sequence()
        .ok_or_else(|| "`ssh_remotes` must be a list of hostnames".to_string())?;

    let mut seen = Vec::with_capacity(hosts.len());
    for (idx, host) in hosts.iter().enumerate() {
        let host = host
            .as_str()
            .ok_or_else(|| format!("`ssh_remotes[{idx}]` must be a string"))?;
        if host.trim().is_empty() {
            return Err(format!("`ssh_remotes[{idx}]` is empty"));
        }
        if host == HOSTED_REMOTE_NAME {
            return Err(format!(
                "`ssh_remotes[{idx}]`: \"{HOSTED_REMOTE_NAME}\" is reserved for the gh remote"
            ));
        }
        if seen.contains(&host) {
            return Err(format!("`ssh_remotes` lists \"{host}\" more than once"));
        }
        seen.push(host);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_and_is_not_ready() {
        let config = BackupConfig::from_yaml_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(!config.enable_hosted_remote);
        assert!(config.ssh_remote_hosts.is_empty());
        assert!(!config.config_confirmed);
    }

    #[test]
    fn test_valid_config_keeps_host_order() {
        let yaml = "gh: true\nssh_remotes:\n  - nas\n  - backup.example.com\nconfig_is_ready: true\n";
        let config = BackupConfig::from_yaml_str(yaml).unwrap();
        assert!(config.enable_hosted_remote);
        assert!(config.config_confirmed);
        assert_eq!(config.ssh_remote_hosts, vec!["nas", "backup.example.com"]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let yaml = "gh: false\nssh_remotes: []\nconfig_is_ready: true\neditor: nano\n";
        assert!(BackupConfig::from_yaml_str(yaml).is_ok());
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = BackupConfig::from_yaml_str("gh: false\nssh_remotes: []\n").unwrap_err();
        assert!(err.contains("config_is_ready"));
    }

    #[test]
    fn test_wrong_types_rejected() {
        let cases = [
            "gh: maybe\nssh_remotes: []\nconfig_is_ready: true\n",
            "gh: false\nssh_remotes: nas\nconfig_is_ready: true\n",
            "gh: false\nssh_remotes:\n  - 42\nconfig_is_ready: true\n",
            "gh: false\nssh_remotes:\nconfig_is_ready: true\n",
            "gh: false\nssh_remotes: []\nconfig_is_ready: 1\n",
            "- gh\n- ssh_remotes\n",
        ];
        for yaml in cases {
            assert!(BackupConfig::from_yaml_str(yaml).is_err(), "accepted: {yaml}");
        }
    }

    #[test]
    fn test_duplicate_and_reserved_hosts_rejected() {
        let dup = "gh: false\nssh_remotes: [nas, nas]\nconfig_is_ready: true\n";
        assert!(BackupConfig::from_yaml_str(dup).is_err());
        let reserved = "gh: false\nssh_remotes: [github]\nconfig_is_ready: true\n";
        assert!(BackupConfig::from_yaml_str(reserved).is_err());
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(matches!(
            BackupConfig::load_from(&path),
            Err(GitBakError::ConfigMissing { .. })
        ));

        std::fs::write(&path, "gh: [").unwrap();
        assert!(matches!(
            BackupConfig::load_from(&path),
            Err(GitBakError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_yaml_1_1_booleans_accepted() {
        let yaml = "gh: yes\nssh_remotes: []\nconfig_is_ready: On\n";
        let config = BackupConfig::from_yaml_str(yaml).unwrap();
        assert!(config.enable_hosted_remote);
        assert!(config.config_confirmed);

        let yaml = "gh: NO\nssh_remotes: []\nconfig_is_ready: off\n";
        let config = BackupConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.enable_hosted_remote);
        assert!(!config.config_confirmed);

        let yaml = "gh: False\nssh_remotes: []\nconfig_is_ready: TRUE\n";
        assert!(BackupConfig::from_yaml_str(yaml).unwrap().config_confirmed);
    }
}
