/// Legacy visualization reports over collected records.
///
/// Used by the `check-legacy` and `diff` commands to track the migration
/// away from legacy visualizations.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{SavedObjectType, VisualizationRecord};

fn is_legacy_type(record: &VisualizationRecord) -> bool {
    record.so_type == SavedObjectType::Visualization
}

/// Legacy visualization count per app, sorted by app.
pub fn legacy_counts_by_app(records: &[VisualizationRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| is_legacy_type(r)) {
        *counts.entry(record.app.clone()).or_insert(0) += 1;
    }
    counts
}

/// Total legacy visualizations across all apps.
pub fn legacy_total(records: &[VisualizationRecord]) -> usize {
    records.iter().filter(|r| is_legacy_type(r)).count()
}

pub fn exceeds_legacy_limit(records: &[VisualizationRecord], limit: usize) -> bool {
    legacy_total(records) > limit
}

/// One app whose legacy count changed between two runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountDifference {
    pub name: String,
    pub before: usize,
    /// `None` when the app is gone from the later run.
    pub after: Option<usize>,
}

/// Apps whose count differs between `before` and `after`.
///
/// Apps that only appear in `after` are reported with a `before` of zero.
pub fn diff_counts(
    before: &BTreeMap<String, usize>,
    after: &BTreeMap<String, usize>,
) -> Vec<CountDifference> {
    let mut diffs: Vec<CountDifference> = before
        .iter()
        .filter(|(name, count)| after.get(*name) != Some(*count))
        .map(|(name, count)| CountDifference {
            name: name.clone(),
            before: *count,
            after: after.get(name).copied(),
        })
        .collect();

    diffs.extend(
        after
            .iter()
            .filter(|(name, _)| !before.contains_key(*name))
            .map(|(name, count)| CountDifference {
                name: name.clone(),
                before: 0,
                after: Some(*count),
            }),
    );

    diffs.sort_by(|a, b| a.name.cmp(&b.name));
    diffs
}
