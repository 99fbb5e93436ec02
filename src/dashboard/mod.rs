//! Dashboard documents: panel resolution and the reference index.
pub mod panels;
pub mod references;

pub use panels::{PanelDescriptor, PanelKind, PanelsJson, resolve_panels};
pub use references::ReferenceIndex;

use serde_json::Value;

use crate::document::lookup_str;

/// Title of a dashboard document, or `""` when it has none.
pub fn dashboard_title(dashboard: &Value) -> &str {
    lookup_str(dashboard, &["attributes", "title"]).unwrap_or_default()
}
