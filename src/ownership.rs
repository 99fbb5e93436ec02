/// Package ownership, read from the package manifest.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::lookup_str;

/// GitHub owner of a package and the group derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    #[serde(default)]
    pub gh_owner: String,
    #[serde(default)]
    pub owning_group: String,
}

impl Ownership {
    /// Derive ownership from a manifest's `owner.github` field.
    ///
    /// `elastic/obs-infra` yields the group `obs-infra`; an owner without a
    /// slash is its own group.
    pub fn from_manifest(manifest: &Value) -> Self {
        let gh_owner = lookup_str(manifest, &["owner", "github"])
            .map(str::trim)
            .unwrap_or_default();
        let owning_group = gh_owner.rsplit('/').next().unwrap_or_default();

        Self {
            gh_owner: gh_owner.to_string(),
            owning_group: owning_group.to_string(),
        }
    }
}
