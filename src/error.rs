/// Error types for the saved-object census.
///
/// Only failures that end a unit of work surface here. A field that fails
/// to decode is never an error; it is left as found.
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while walking a corpus of saved objects.
#[derive(Error, Debug)]
pub enum CensusError {
    #[error("cannot enumerate packages under {path}: {source}")]
    PackageRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid saved object {path}: {source}")]
    ParseDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest not found: {0}")]
    MissingManifest(PathBuf),

    #[error("invalid manifest {path}: {source}")]
    ParseManifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CensusError {
    /// Whether the failure is scoped to a single document.
    #[must_use]
    pub fn is_document_level(&self) -> bool {
        matches!(self, Self::ReadFile { .. } | Self::ParseDocument { .. })
    }
}

pub type Result<T, E = CensusError> = std::result::Result<T, E>;
