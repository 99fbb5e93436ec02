use serde_json::Value;

use crate::document::lookup;
use crate::record::{LinkKind, SavedObjectType};

/// The `panelsJSON` attribute in either of its encodings.
///
/// Legacy dashboards store the panel list as a JSON string; current ones
/// store the array directly.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelsJson {
    Encoded(String),
    Structured(Vec<Value>),
}

impl PanelsJson {
    /// Read the `attributes.panelsJSON` of a dashboard document.
    pub fn from_dashboard(dashboard: &Value) -> Option<Self> {
        lookup(dashboard, &["attributes", "panelsJSON"]).and_then(Self::from_value)
    }

    /// Classify a raw `panelsJSON` value. Other JSON types yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Encoded(s.clone())),
            Value::Array(items) => Some(Self::Structured(items.clone())),
            _ => None,
        }
    }

    /// Panel entries in document order.
    ///
    /// An encoded list that does not decode to an array yields no panels.
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Structured(items) => items,
            Self::Encoded(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(items)) => items,
                Ok(_) => Vec::new(),
                Err(e) => {
                    tracing::debug!("undecodable panelsJSON: {e}");
                    Vec::new()
                }
            },
        }
    }
}

/// Whether a panel embeds its visualization.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    /// Points to a separately stored saved object.
    ByReference,
    /// Carries the visualization inline; holds the whole panel mapping.
    ByValue(Value),
}

/// One dashboard panel after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDescriptor {
    /// Saved-object type named by the panel's `type`, when it is one we track.
    pub so_type: Option<SavedObjectType>,
    pub kind: PanelKind,
}

impl PanelDescriptor {
    /// Resolve a single panel entry. Non-object entries are not panels.
    pub fn from_panel(panel: &Value) -> Option<Self> {
        let entries = panel.as_object()?;

        let so_type = entries
            .get("type")
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<SavedObjectType>().ok());

        let embedded_key = match so_type {
            Some(SavedObjectType::Visualization) => Some("savedVis"),
            Some(SavedObjectType::Lens | SavedObjectType::Map) => Some("attributes"),
            _ => None,
        };

        let by_value = embedded_key
            .is_some_and(|key| lookup(panel, &["embeddableConfig", key]).is_some());

        let kind = if by_value {
            PanelKind::ByValue(panel.clone())
        } else {
            PanelKind::ByReference
        };

        Some(Self { so_type, kind })
    }

    pub fn link(&self) -> LinkKind {
        match self.kind {
            PanelKind::ByReference => LinkKind::ByReference,
            PanelKind::ByValue(_) => LinkKind::ByValue,
        }
    }

    /// The embedded document of a by-value panel.
    pub fn embedded(&self) -> Option<&Value> {
        match &self.kind {
            PanelKind::ByValue(doc) => Some(doc),
            PanelKind::ByReference => None,
        }
    }

    /// Split a by-value descriptor into its type and document.
    pub fn into_by_value(self) -> Option<(SavedObjectType, Value)> {
        match (self.so_type, self.kind) {
            (Some(so_type), PanelKind::ByValue(doc)) => Some((so_type, doc)),
            _ => None,
        }
    }
}

/// Resolve every panel of a `panelsJSON` value, preserving order.
pub fn resolve_panels(panels: PanelsJson) -> Vec<PanelDescriptor> {
    panels
        .into_entries()
        .iter()
        .filter_map(PanelDescriptor::from_panel)
        .collect()
}
