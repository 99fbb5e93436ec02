use std::collections::HashMap;

use serde_json::Value;

use super::dashboard_title;

/// Saved-object id to the title of the dashboard referencing it.
///
/// Scoped to one package. When several dashboards reference the same id,
/// the dashboard folded in last wins.
#[derive(Debug, Default, Clone)]
pub struct ReferenceIndex {
    titles: HashMap<String, String>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a dashboard's `references` into the index.
    ///
    /// Returns how many reference ids were recorded.
    pub fn record_dashboard(&mut self, dashboard: &Value) -> usize {
        let title = dashboard_title(dashboard);
        let Some(references) = dashboard.get("references").and_then(Value::as_array) else {
            return 0;
        };

        let mut recorded = 0;
        for id in references
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str))
        {
            if let Some(previous) = self.titles.insert(id.to_string(), title.to_string()) {
                if previous != title {
                    tracing::debug!("{id} re-attributed from {previous:?} to {title:?}");
                }
            }
            recorded += 1;
        }
        recorded
    }

    /// Dashboard title for `id`, or `""` when no dashboard references it.
    pub fn dashboard_for(&self, id: &str) -> &str {
        self.titles.get(id).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
