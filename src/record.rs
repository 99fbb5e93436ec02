//! Output records and the small vocabularies they are built from.
//!
//! Field names serialize exactly as the `legacy_vis` index mapping expects
//! them, so records can be shipped to the index without reshaping.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::Classification;
use crate::ownership::Ownership;

/// Saved-object types a visualization record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedObjectType {
    Visualization,
    Lens,
    Map,
    Search,
}

impl SavedObjectType {
    /// Standalone object folders, in scan order.
    pub const ALL: [SavedObjectType; 4] = [Self::Visualization, Self::Lens, Self::Map, Self::Search];

    pub fn as_str(&self) -> &'static str {
        match self {
            SavedObjectType::Visualization => "visualization",
            SavedObjectType::Lens => "lens",
            SavedObjectType::Map => "map",
            SavedObjectType::Search => "search",
        }
    }

    /// Name of the package folder holding standalone objects of this type.
    pub fn folder_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for SavedObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SavedObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visualization" => Ok(Self::Visualization),
            "lens" => Ok(Self::Lens),
            "map" => Ok(Self::Map),
            "search" => Ok(Self::Search),
            other => Err(format!("unsupported saved object type: {other}")),
        }
    }
}

/// How a visualization is attached to its dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    ByReference,
    ByValue,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::ByReference => "by_reference",
            LinkKind::ByValue => "by_value",
        }
    }
}

/// Where a package of saved objects comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Integration,
    Beat,
}

/// Provenance of a file: the last commit that touched it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    pub date: Option<DateTime<FixedOffset>>,
}

/// One normalized visualization, ready for the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRecord {
    pub doc: Value,
    #[serde(rename = "soType")]
    pub so_type: SavedObjectType,
    pub app: String,
    pub source: SourceKind,
    pub link: LinkKind,
    #[serde(default)]
    pub dashboard: String,
    pub path: String,
    #[serde(default)]
    pub commit: CommitInfo,
    #[serde(default)]
    pub manifest: Value,
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(flatten)]
    pub ownership: Ownership,
}

impl VisualizationRecord {
    /// Whether this record counts toward the legacy visualization total.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.classification.is_legacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> VisualizationRecord {
        VisualizationRecord {
            doc: json!({"id": "v1"}),
            so_type: SavedObjectType::Visualization,
            app: "nginx".into(),
            source: SourceKind::Integration,
            link: LinkKind::ByReference,
            dashboard: "Sales Overview".into(),
            path: "packages/nginx/kibana/visualization/v1.json".into(),
            commit: CommitInfo::default(),
            manifest: json!({"name": "nginx"}),
            classification: Classification {
                vis_type: "metrics".into(),
                vis_tsvb_type: "timeseries".into(),
                vis_title: "Requests".into(),
                is_legacy: true,
            },
            ownership: Ownership {
                gh_owner: "elastic/obs-infra".into(),
                owning_group: "obs-infra".into(),
            },
        }
    }

    #[test]
    fn test_record_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "doc",
            "soType",
            "app",
            "source",
            "link",
            "dashboard",
            "path",
            "commit",
            "manifest",
            "vis_type",
            "vis_tsvb_type",
            "vis_title",
            "is_legacy",
            "gh_owner",
            "owning_group",
        ] {
            assert!(obj.contains_key(key), "missing field {key}");
        }
        assert_eq!(obj.len(), 15);
        assert_eq!(value["soType"], "visualization");
        assert_eq!(value["link"], "by_reference");
        assert_eq!(value["source"], "integration");
        assert_eq!(value["commit"], json!({"hash": "", "author": "", "date": null}));
    }

    #[test]
    fn test_record_reads_back() {
        let text = serde_json::to_string(&sample()).unwrap();
        let parsed: VisualizationRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_saved_object_type_parse() {
        assert_eq!("lens".parse::<SavedObjectType>(), Ok(SavedObjectType::Lens));
        assert!("dashboard".parse::<SavedObjectType>().is_err());
        assert_eq!(SavedObjectType::Map.to_string(), "map");
    }

    #[test]
    fn test_link_kind_str_matches_serde() {
        for link in [LinkKind::ByReference, LinkKind::ByValue] {
            assert_eq!(serde_json::to_value(link).unwrap(), link.as_str());
        }
    }
}
