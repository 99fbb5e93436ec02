/// Configuration module for viscensus.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::record::SavedObjectType;

// ── Default value functions ──────────────────────────────────────────

fn default_integrations_dir() -> PathBuf {
    PathBuf::from("../integrations")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./result.json")
}

fn default_object_folders() -> Vec<SavedObjectType> {
    SavedObjectType::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_legacy_limit() -> usize {
    296
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Root of an integrations checkout; packages live under `packages/`.
    #[serde(default = "default_integrations_dir")]
    pub integrations_dir: PathBuf,

    /// Root of a beats checkout. Beats are skipped when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beats_dir: Option<PathBuf>,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Standalone object folders scanned in every package.
    #[serde(default = "default_object_folders")]
    pub object_folders: Vec<SavedObjectType>,

    /// Package name globs; empty means every package.
    #[serde(default)]
    pub include_packages: Vec<String>,

    /// Worker threads for package processing; 0 uses available parallelism.
    #[serde(default)]
    pub workers: usize,

    /// Look up commit provenance for every file.
    #[serde(default = "default_true")]
    pub provenance: bool,

    #[serde(default = "default_legacy_limit")]
    pub legacy_limit: usize,
}

// ── Default impl ─────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            integrations_dir: default_integrations_dir(),
            beats_dir: None,
            output_path: default_output_path(),
            object_folders: default_object_folders(),
            include_packages: Vec::new(),
            workers: 0,
            provenance: default_true(),
            legacy_limit: default_legacy_limit(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"viscensus.json"`.
    /// If the file does not exist, returns a default config and, for the
    /// default path only, writes a template next to it.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "viscensus.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == "viscensus.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let mut cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");

        if cfg.object_folders.is_empty() {
            cfg.object_folders = default_object_folders();
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.object_folders.is_empty(),
            "at least one object folder must be specified"
        );
        anyhow::ensure!(
            !self.output_path.as_os_str().is_empty(),
            "output_path must not be empty"
        );
        self.package_filter()?;
        Ok(())
    }

    /// Compile `include_packages` into a matcher. `None` matches everything.
    pub fn package_filter(&self) -> Result<Option<GlobSet>> {
        if self.include_packages.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.include_packages {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid package glob: {pattern}"))?;
            builder.add(glob);
        }
        Ok(Some(builder.build().context("failed to build package filter")?))
    }

    /// Number of worker threads to use.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }

    /// Directory holding one sub-directory per integration package.
    #[must_use]
    pub fn packages_dir(&self) -> PathBuf {
        self.integrations_dir.join("packages")
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.integrations_dir, PathBuf::from("../integrations"));
        assert_eq!(config.output_path, PathBuf::from("./result.json"));
        assert_eq!(config.object_folders.len(), 4);
        assert_eq!(config.legacy_limit, 296);
        assert!(config.provenance);
        assert!(config.beats_dir.is_none());
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"integrations_dir": "/src/integrations", "object_folders": ["lens", "map"], "workers": 3}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.packages_dir(),
            PathBuf::from("/src/integrations/packages")
        );
        assert_eq!(
            config.object_folders,
            vec![SavedObjectType::Lens, SavedObjectType::Map]
        );
        assert_eq!(config.worker_count(), 3);
        // Other fields should have defaults
        assert_eq!(config.legacy_limit, 296);
    }

    #[test]
    fn test_unknown_object_folder_rejected() {
        let json = r#"{"object_folders": ["dashboard"]}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_folders() {
        let mut config = Config::default();
        config.object_folders = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_glob() {
        let mut config = Config::default();
        config.include_packages = vec!["aws[".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_package_filter() {
        let mut config = Config::default();
        assert!(config.package_filter().unwrap().is_none());

        config.include_packages = vec!["aws*".to_string(), "nginx".to_string()];
        let filter = config.package_filter().unwrap().unwrap();
        assert!(filter.is_match("aws_bedrock"));
        assert!(filter.is_match("nginx"));
        assert!(!filter.is_match("nginx_ingress_controller"));
    }

    #[test]
    fn test_worker_count_auto() {
        assert!(Config::default().worker_count() >= 1);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("custom.json");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.legacy_limit, 296);
        // Templates are only written for the default path.
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("viscensus.json");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.beats_dir = Some(PathBuf::from("../beats"));
        config.workers = 2;
        config.save(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.beats_dir, Some(PathBuf::from("../beats")));
        assert_eq!(loaded.workers, 2);
    }
}
