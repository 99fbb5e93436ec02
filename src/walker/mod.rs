//! Corpus walker.
//!
//! Enumerates packages and turns each into a batch of visualization
//! records. Packages are processed in parallel on a `rayon` pool, sharing
//! only the manifest cache; results come back in package order regardless
//! of the worker count.
pub mod package;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{CensusError, Result};
use crate::manifest::{MANIFEST_FILE, ManifestCache};
use crate::provenance::{GitLog, NoProvenance, Provenance};
use crate::record::{SavedObjectType, VisualizationRecord};

pub use package::PackageOrigin;

/// Sub-directory of a package holding its saved objects.
pub const KIBANA_DIR: &str = "kibana";

/// Beats keep their saved objects for the current major under this name.
pub const BEATS_CONTENT_DIR: &str = "7";

/// Object folders scanned in beats content. Beats ship no saved searches
/// worth tracking.
pub const BEAT_FOLDERS: [SavedObjectType; 3] = [
    SavedObjectType::Visualization,
    SavedObjectType::Lens,
    SavedObjectType::Map,
];

/// Entry point for a census run.
///
/// Holds everything shared across packages: the configuration, the
/// provenance lookup and the manifest cache.
pub struct CorpusWalker {
    config: Config,
    provenance: Box<dyn Provenance>,
    manifests: ManifestCache,
    package_filter: Option<GlobSet>,
}

impl CorpusWalker {
    pub fn new(config: Config, provenance: Box<dyn Provenance>) -> anyhow::Result<Self> {
        let package_filter = config.package_filter()?;
        Ok(Self {
            config,
            provenance,
            manifests: ManifestCache::new(),
            package_filter,
        })
    }

    /// Build a walker whose provenance follows `config.provenance`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let provenance: Box<dyn Provenance> = if config.provenance {
            Box::new(GitLog::default())
        } else {
            Box::new(NoProvenance)
        };
        Self::new(config, provenance)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one integration package directory.
    ///
    /// Fails when the package manifest is missing or invalid; the caller
    /// skips the package in that case.
    pub fn process(&self, package_dir: &Path) -> Result<Vec<VisualizationRecord>> {
        let app = package_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let manifest = self
            .manifests
            .get_or_load(&package_dir.join(MANIFEST_FILE))?;

        let origin = PackageOrigin::integration(app, manifest);
        let records = self.process_kibana(
            &package_dir.join(KIBANA_DIR),
            &origin,
            &self.config.object_folders,
        );
        info!("Collected {} vis in {}", records.len(), origin.app);
        Ok(records)
    }

    /// Collect every package under `<integrations_dir>/packages`.
    ///
    /// Only failing to list the packages directory is an error; a failing
    /// package is logged and skipped.
    pub fn collect_integrations(&self) -> Result<Vec<VisualizationRecord>> {
        let packages_dir = self.config.packages_dir();
        info!("Collecting integrations from {}", packages_dir.display());

        let entries = fs::read_dir(&packages_dir).map_err(|source| CensusError::PackageRoot {
            path: packages_dir.clone(),
            source,
        })?;

        let mut packages: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| self.is_included(p))
            .collect();
        packages.sort();

        let batches: Vec<Vec<VisualizationRecord>> = self.in_pool(|| {
            packages
                .par_iter()
                .map(|dir| match self.process(dir) {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("Skipping package {}: {e}", dir.display());
                        Vec::new()
                    }
                })
                .collect()
        });

        Ok(batches.into_iter().flatten().collect())
    }

    /// Collect beats content: every `7` directory below `beats_dir`.
    pub fn collect_beats(&self, beats_dir: &Path) -> Result<Vec<VisualizationRecord>> {
        if !beats_dir.is_dir() {
            return Err(CensusError::PackageRoot {
                path: beats_dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        info!("Collecting beats from {}", beats_dir.display());

        let roots = find_beats_content(beats_dir);
        let batches: Vec<Vec<VisualizationRecord>> = self.in_pool(|| {
            roots
                .par_iter()
                .map(|content_dir| {
                    let app = content_dir
                        .parent()
                        .map(|p| p.to_string_lossy().replace('\\', "/"))
                        .unwrap_or_default();
                    let origin = PackageOrigin::beat(app);
                    let records = self.process_kibana(content_dir, &origin, &BEAT_FOLDERS);
                    info!("Collected {} vis in {}", records.len(), origin.app);
                    records
                })
                .collect()
        });

        Ok(batches.into_iter().flatten().collect())
    }

    /// Run a full census: integrations, then beats when configured.
    ///
    /// Never fails; an unreadable root contributes no records.
    pub fn census(&self) -> Vec<VisualizationRecord> {
        let mut records = self.collect_integrations().unwrap_or_else(|e| {
            error!("{e}");
            Vec::new()
        });

        if let Some(beats_dir) = &self.config.beats_dir {
            match self.collect_beats(beats_dir) {
                Ok(beats) => records.extend(beats),
                Err(e) => error!("{e}"),
            }
        }

        info!("Collected {} visualizations", records.len());
        records
    }

    fn is_included(&self, package_dir: &Path) -> bool {
        match (&self.package_filter, package_dir.file_name()) {
            (None, _) => true,
            (Some(filter), Some(name)) => filter.is_match(name),
            (Some(_), None) => false,
        }
    }

    fn in_pool<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count())
            .build()
        {
            Ok(pool) => pool.install(op),
            Err(e) => {
                warn!("Falling back to the global thread pool: {e}");
                op()
            }
        }
    }
}

/// Directories named `7` below `root`, sorted. Matched directories are not
/// searched further.
fn find_beats_content(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .is_none_or(|parent| parent != OsStr::new(BEATS_CONTENT_DIR))
                || entry.depth() == 0
        })
        .build();

    walker
        .filter_map(|e| e.ok())
        .filter(|e| e.depth() > 0)
        .filter(|e| e.file_type().is_some_and(|t| t.is_dir()))
        .filter(|e| e.file_name() == OsStr::new(BEATS_CONTENT_DIR))
        .map(|e| e.into_path())
        .collect()
}
