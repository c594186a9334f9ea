//! Configuration file support for sinth.
//!
//! sinth supports two configuration file locations:
//! - Global: `~/.sinth/config.toml` - User-wide defaults
//! - Project: `.sinth/config.toml` - Registry-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ops::validate::OutputFormat;

/// Name of the per-user and per-project config directory.
pub const CONFIG_DIR: &str = ".sinth";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// sinth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation settings
    pub validate: ValidateConfig,

    /// Registry location
    pub registry: RegistryConfig,
}

/// Validation-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Stop at the first violation
    #[serde(default)]
    pub fail_fast: bool,

    /// Number of packages checked in parallel (None = auto-detect)
    pub jobs: Option<usize>,

    /// Default output format (human, json, github)
    pub format: Option<String>,
}

/// Registry-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry root used when no root is given on the command line
    pub root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.validate.fail_fast {
            self.validate.fail_fast = true;
        }
        if other.validate.jobs.is_some() {
            self.validate.jobs = other.validate.jobs;
        }
        if other.validate.format.is_some() {
            self.validate.format = other.validate.format;
        }

        if other.registry.root.is_some() {
            self.registry.root = other.registry.root;
        }
    }

    /// Look up a dotted key such as `validate.format`.
    ///
    /// Unset optional keys are not found.
    pub fn get(&self, key: &str) -> Result<Option<toml::Value>> {
        let root = toml::Value::try_from(self).context("failed to serialize config")?;
        let found = key.split('.').try_fold(&root, |value, part| value.get(part));
        Ok(found.cloned())
    }

    /// Parse the output format from the config string.
    ///
    /// An unrecognized value is logged and ignored.
    pub fn output_format(&self) -> Option<OutputFormat> {
        let value = self.validate.format.as_ref()?;
        match value.parse() {
            Ok(format) => Some(format),
            Err(e) => {
                tracing::warn!("Ignoring validate.format in config: {}", e);
                None
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sinth/config.toml)
/// 2. Global config (~/.sinth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global sinth config directory (~/.sinth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.sinth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the project config path (.sinth/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.validate.fail_fast);
        assert!(config.validate.jobs.is_none());
        assert!(config.registry.root.is_none());
        assert!(config.output_format().is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[validate]
fail_fast = true
jobs = 4
format = "github"

[registry]
root = "/srv/aim"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert!(config.validate.fail_fast);
        assert_eq!(config.validate.jobs, Some(4));
        assert_eq!(config.output_format(), Some(OutputFormat::Github));
        assert_eq!(config.registry.root, Some(PathBuf::from("/srv/aim")));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.validate.jobs = Some(2);
        base.validate.format = Some("json".to_string());

        let mut override_cfg = Config::default();
        override_cfg.validate.format = Some("human".to_string());

        base.merge(override_cfg);

        assert_eq!(base.validate.format, Some("human".to_string()));
        assert_eq!(base.validate.jobs, Some(2)); // Not overridden
    }

    #[test]
    fn test_config_get() {
        let mut config = Config::default();
        config.validate.jobs = Some(4);
        config.validate.format = Some("json".to_string());

        assert_eq!(
            config.get("validate.jobs").unwrap(),
            Some(toml::Value::Integer(4))
        );
        assert_eq!(
            config.get("validate.format").unwrap(),
            Some(toml::Value::String("json".to_string()))
        );
        assert_eq!(
            config.get("validate.fail_fast").unwrap(),
            Some(toml::Value::Boolean(false))
        );
        assert!(config.get("registry.root").unwrap().is_none());
        assert!(config.get("validate.nope").unwrap().is_none());
        assert!(config.get("validate").unwrap().unwrap().is_table());
    }

    #[test]
    fn test_invalid_format_ignored() {
        let mut config = Config::default();
        config.validate.format = Some("xml".to_string());
        assert!(config.output_format().is_none());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[validate]
jobs = 8
format = "json"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[validate]
format = "github"
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);
        assert_eq!(config.validate.format, Some("github".to_string()));
        assert_eq!(config.validate.jobs, Some(8));
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join("project.toml");
        std::fs::write(&project_path, "[validate\njobs = ").unwrap();

        let config = load_config(&tmp.path().join("missing.toml"), &project_path);
        assert!(config.validate.jobs.is_none());
    }
}
