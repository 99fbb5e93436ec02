/// Package manifest loading.
///
/// Manifests are YAML; they are decoded straight into a JSON value so they
/// can be attached to records as-is. A [`ManifestCache`] keeps each
/// manifest loaded once per walker, even across repeated collections.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{CensusError, Result};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "manifest.yml";

/// Load a YAML manifest as a JSON value.
pub fn load_manifest(path: &Path) -> Result<Value> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CensusError::MissingManifest(path.to_path_buf()));
        }
        Err(source) => {
            return Err(CensusError::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse_manifest(&content).map_err(|source| CensusError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse manifest text. An empty document yields `Value::Null`.
pub fn parse_manifest(content: &str) -> std::result::Result<Value, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(content)
}

/// Manifests already loaded, keyed by path. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: RwLock<HashMap<PathBuf, Arc<Value>>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached manifest for `path`, loading it on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Value>> {
        if let Some(found) = self.entries.read().get(path) {
            return Ok(Arc::clone(found));
        }

        let manifest = Arc::new(load_manifest(path)?);
        let mut entries = self.entries.write();
        let cached = entries.entry(path.to_path_buf()).or_insert(manifest);
        Ok(Arc::clone(cached))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
