use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SplitwardenError;

/// Device line-length budget for one `anyconnect-custom-data` value.
pub const DEFAULT_MAX_SEGMENT_LENGTH: usize = 421;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub orchestrator: OrchestratorConfig,
    pub inventory: InventoryConfig,
    pub policy: PolicyConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub fanout: FanoutConfig,
    #[serde(default)]
    pub events: EventConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub url: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub failure_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub group_policy: String,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default)]
    pub include_domains: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_segment_length: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FanoutConfig {
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default = "default_true")]
    pub stderr: bool,
    #[serde(default = "default_true")]
    pub jsonl: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub event_log_path: PathBuf,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
        }
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self { workers: 8 }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            stderr: true,
            jsonl: true,
        }
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            orchestrator: OrchestratorConfig {
                url: "https://nso-server:8888".to_string(),
                username: "user1".to_string(),
                password: None,
                accept_invalid_certs: true,
                timeout_secs: default_timeout_secs(),
                failure_markers: Vec::new(),
            },
            inventory: InventoryConfig {
                devices: vec!["vpn-device-1".to_string(), "vpn-device-2".to_string()],
            },
            policy: PolicyConfig {
                group_policy: "DEFAULT_GROUP_POLICY".to_string(),
                exclude_domains: vec![
                    "webex.com".to_string(),
                    "netflix.com".to_string(),
                    "youtube.com".to_string(),
                ],
                include_domains: vec!["cisco.com".to_string()],
            },
            chunking: ChunkingConfig::default(),
            fanout: FanoutConfig::default(),
            events: EventConfig::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let output = toml::to_string_pretty(self).context("render config TOML")?;
        Ok(output)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let contents = self.to_toml_string()?;
        fs::write(path, contents).with_context(|| format!("write config at {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SplitwardenError> {
        if self.orchestrator.url.trim().is_empty() {
            return Err(SplitwardenError::InvalidConfig(
                "orchestrator.url must not be empty".to_string(),
            ));
        }
        let group_policy = self.policy.group_policy.trim();
        if group_policy.is_empty() || group_policy.contains(char::is_whitespace) {
            return Err(SplitwardenError::InvalidConfig(format!(
                "policy.group_policy {:?} must be a single non-empty word",
                self.policy.group_policy
            )));
        }
        if self.chunking.max_segment_length < 2 {
            return Err(SplitwardenError::InvalidConfig(
                "chunking.max_segment_length must be at least 2".to_string(),
            ));
        }
        if self.fanout.workers == 0 {
            return Err(SplitwardenError::InvalidConfig(
                "fanout.workers must be at least 1".to_string(),
            ));
        }
        for domain in self
            .policy
            .exclude_domains
            .iter()
            .chain(&self.policy.include_domains)
        {
            validate_domain(domain)?;
        }
        Ok(())
    }

    /// Password from `SPLITWARDEN_PASSWORD`, falling back to the config file.
    pub fn resolve_password(&self) -> Option<String> {
        std::env::var("SPLITWARDEN_PASSWORD")
            .ok()
            .or_else(|| self.orchestrator.password.clone())
    }
}

/// Rejects values the device would split or misread inside a data object.
pub fn validate_domain(domain: &str) -> Result<(), SplitwardenError> {
    let trimmed = domain.trim();
    let reason = if trimmed.is_empty() {
        Some("empty")
    } else if trimmed.contains(',') {
        Some("contains a comma")
    } else if trimmed.contains(char::is_whitespace) {
        Some("contains whitespace")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SplitwardenError::InvalidDomain {
            domain: domain.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Trimmed, de-duplicated, sorted view of a configured domain list.
pub fn normalize_domains<S: AsRef<str>>(domains: &[S]) -> BTreeSet<String> {
    domains
        .iter()
        .map(|domain| domain.as_ref().trim())
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .collect()
}

impl ConfigPaths {
    pub fn resolve() -> Result<Self> {
        let project_dirs = ProjectDirs::from("io", "splitwarden", "splitwarden")
            .ok_or_else(|| anyhow::anyhow!("unable to determine project directories"))?;
        let config_dir = project_dirs.config_dir();
        let data_dir = project_dirs.data_dir();
        Ok(Self {
            config_path: config_dir.join("config.toml"),
            data_dir: data_dir.to_path_buf(),
            event_log_path: data_dir.join("events.jsonl"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrip() {
        let config = Config::default_config();
        let rendered = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed.policy.group_policy, "DEFAULT_GROUP_POLICY");
        assert_eq!(parsed.chunking.max_segment_length, DEFAULT_MAX_SEGMENT_LENGTH);
        assert_eq!(parsed.inventory.devices.len(), 2);
    }

    #[test]
    fn test_optional_sections_default() {
        let config = Config::from_toml_str(
            r#"
[orchestrator]
url = "https://nso:8888"
username = "admin"

[inventory]
devices = ["asa-1"]

[policy]
group_policy = "Remote"
exclude_domains = ["webex.com"]
"#,
        )
        .unwrap();
        assert_eq!(config.chunking.max_segment_length, 421);
        assert_eq!(config.fanout.workers, 8);
        assert_eq!(config.orchestrator.timeout_secs, 30);
        assert!(config.policy.include_domains.is_empty());
        assert!(config.events.stderr);
    }

    #[test]
    fn test_rejects_bad_domain() {
        let mut config = Config::default_config();
        config.policy.exclude_domains.push("a.com,b.com".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SplitwardenError::InvalidDomain { .. }));

        let mut config = Config::default_config();
        config.policy.include_domains.push("bad domain".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_workers_and_tiny_segments() {
        let mut config = Config::default_config();
        config.fanout.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.chunking.max_segment_length = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalize_domains() {
        let domains = normalize_domains(&[" b.com", "a.com", "b.com", ""]);
        let collected: Vec<&str> = domains.iter().map(String::as_str).collect();
        assert_eq!(collected, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default_config();
        config.fanout.workers = 3;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.fanout.workers, 3);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let contents = r#"
[orchestrator]
url = "https://nso-server:8888"
username = "user1"

[inventory]
devices = ["vpn-device-1"]

[policy]
group_policy = "DEFAULT_GROUP_POLICY"
exclude_domains = ["webex.com"]

[events]
stderr = false
"#;
        let config = Config::from_toml_str(contents).unwrap();
        assert!(!config.events.stderr);
        assert!(config.events.jsonl);
        assert_eq!(config.orchestrator.timeout_secs, 30);
        assert_eq!(config.chunking.max_segment_length, DEFAULT_MAX_SEGMENT_LENGTH);
        assert_eq!(config.fanout.workers, 8);
        assert!(config.policy.include_domains.is_empty());
    }
}
