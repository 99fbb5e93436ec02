/// Visualization classification.
///
/// Derives the visualization type, TSVB sub-type, title and legacy flag
/// from a decoded saved object. Standalone objects and by-value dashboard
/// panels keep these fields under different paths, so both shapes are
/// inspected. Classification is best-effort: anything missing comes back
/// empty and the record is still emitted.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::access::{first_str, lookup, lookup_str};
use crate::record::{LinkKind, SavedObjectType};

/// Internal vis type tag of the time-series visual builder.
pub const TSVB_VIS_TYPE: &str = "metrics";

/// Classification fields attached to every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub vis_type: String,
    #[serde(default)]
    pub vis_tsvb_type: String,
    #[serde(default)]
    pub vis_title: String,
    #[serde(default)]
    pub is_legacy: bool,
}

impl Classification {
    /// Classify a document of the given saved-object type and link kind.
    ///
    /// `doc` is the standalone saved object for by-reference records and
    /// the dashboard panel for by-value ones.
    pub fn of(so_type: SavedObjectType, link: LinkKind, doc: &Value) -> Self {
        match so_type {
            SavedObjectType::Visualization => Self::legacy_visualization(link, doc),
            SavedObjectType::Lens | SavedObjectType::Map | SavedObjectType::Search => Self {
                vis_type: so_type.as_str().to_string(),
                vis_tsvb_type: String::new(),
                vis_title: modern_title(link, doc).to_string(),
                is_legacy: false,
            },
        }
    }

    fn legacy_visualization(link: LinkKind, doc: &Value) -> Self {
        let (state_path, title): (&[&str], &str) = match link {
            LinkKind::ByReference => (
                &["attributes", "visState"],
                first_str(
                    doc,
                    &[&["attributes", "title"], &["attributes", "visState", "title"]],
                )
                .unwrap_or_default(),
            ),
            LinkKind::ByValue => (
                &["embeddableConfig", "savedVis"],
                first_str(
                    doc,
                    &[
                        &["embeddableConfig", "savedVis", "title"],
                        &["embeddableConfig", "title"],
                        &["title"],
                    ],
                )
                .unwrap_or_default(),
            ),
        };

        let state = lookup(doc, state_path);
        let vis_type = state
            .and_then(|s| lookup_str(s, &["type"]))
            .unwrap_or_default()
            .to_string();
        let vis_tsvb_type = if vis_type == TSVB_VIS_TYPE {
            state
                .and_then(|s| lookup_str(s, &["params", "type"]))
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        };

        Self {
            vis_type,
            vis_tsvb_type,
            vis_title: title.to_string(),
            is_legacy: true,
        }
    }

    /// Whether the visualization belongs to the TSVB family.
    #[must_use]
    pub fn is_tsvb(&self) -> bool {
        self.vis_type == TSVB_VIS_TYPE
    }
}

fn modern_title(link: LinkKind, doc: &Value) -> &str {
    let found = match link {
        LinkKind::ByReference => first_str(doc, &[&["attributes", "title"]]),
        LinkKind::ByValue => first_str(
            doc,
            &[
                &["embeddableConfig", "attributes", "title"],
                &["embeddableConfig", "title"],
                &["title"],
            ],
        ),
    };
    found.unwrap_or_default()
}
