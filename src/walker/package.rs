//! Single-package processing: dashboards first, then standalone objects.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::CorpusWalker;
use crate::classify::Classification;
use crate::dashboard::{PanelsJson, ReferenceIndex, dashboard_title, resolve_panels};
use crate::document::{lookup_str, normalize_document};
use crate::error::{CensusError, Result};
use crate::ownership::Ownership;
use crate::record::{CommitInfo, LinkKind, SavedObjectType, SourceKind, VisualizationRecord};

/// Folder of a package's kibana directory holding dashboards.
pub const DASHBOARD_FOLDER: &str = "dashboard";

/// Who a package belongs to; stamped onto every record it yields.
#[derive(Debug, Clone)]
pub struct PackageOrigin {
    pub app: String,
    pub source: SourceKind,
    pub manifest: Arc<Value>,
    pub ownership: Ownership,
}

impl PackageOrigin {
    pub fn integration(app: impl Into<String>, manifest: Arc<Value>) -> Self {
        let ownership = Ownership::from_manifest(&manifest);
        Self {
            app: app.into(),
            source: SourceKind::Integration,
            manifest,
            ownership,
        }
    }

    /// Beats carry no manifest and no ownership.
    pub fn beat(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            source: SourceKind::Beat,
            manifest: Arc::new(Value::Null),
            ownership: Ownership::default(),
        }
    }
}

impl CorpusWalker {
    /// Collect every visualization record of one kibana directory.
    ///
    /// Dashboards are read first so the reference index is complete before
    /// standalone objects look up their dashboard title. Missing folders
    /// contribute nothing.
    pub fn process_kibana(
        &self,
        kibana_dir: &Path,
        origin: &PackageOrigin,
        folders: &[SavedObjectType],
    ) -> Vec<VisualizationRecord> {
        let (mut records, index) = self.collect_dashboards(kibana_dir, origin);
        debug!(
            "{}: {} by-value panels, {} referenced ids",
            origin.app,
            records.len(),
            index.len()
        );

        for so_type in folders {
            records.extend(self.collect_folder(kibana_dir, origin, *so_type, &index));
        }
        records
    }

    fn collect_dashboards(
        &self,
        kibana_dir: &Path,
        origin: &PackageOrigin,
    ) -> (Vec<VisualizationRecord>, ReferenceIndex) {
        let mut index = ReferenceIndex::new();
        let mut records = Vec::new();

        for path in list_files(&kibana_dir.join(DASHBOARD_FOLDER)) {
            let dashboard = match read_document(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping dashboard: {e}");
                    continue;
                }
            };
            let commit = self.commit_info(&path);
            index.record_dashboard(&dashboard);

            let title = dashboard_title(&dashboard);
            let Some(panels) = PanelsJson::from_dashboard(&dashboard) else {
                continue;
            };
            for (so_type, doc) in resolve_panels(panels)
                .into_iter()
                .filter_map(|p| p.into_by_value())
            {
                records.push(build_record(
                    origin,
                    doc,
                    so_type,
                    LinkKind::ByValue,
                    title.to_string(),
                    &path,
                    commit.clone(),
                ));
            }
        }

        (records, index)
    }

    fn collect_folder(
        &self,
        kibana_dir: &Path,
        origin: &PackageOrigin,
        so_type: SavedObjectType,
        index: &ReferenceIndex,
    ) -> Vec<VisualizationRecord> {
        let mut records = Vec::new();

        for path in list_files(&kibana_dir.join(so_type.folder_name())) {
            let mut doc = match read_document(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {so_type}: {e}");
                    continue;
                }
            };
            let commit = self.commit_info(&path);
            normalize_document(&mut doc);

            let dashboard = lookup_str(&doc, &["id"])
                .map(|id| index.dashboard_for(id))
                .unwrap_or_default()
                .to_string();

            records.push(build_record(
                origin,
                doc,
                so_type,
                LinkKind::ByReference,
                dashboard,
                &path,
                commit,
            ));
        }

        records
    }

    fn commit_info(&self, path: &Path) -> CommitInfo {
        self.provenance.commit_info(path).unwrap_or_default()
    }
}

fn build_record(
    origin: &PackageOrigin,
    doc: Value,
    so_type: SavedObjectType,
    link: LinkKind,
    dashboard: String,
    path: &Path,
    commit: CommitInfo,
) -> VisualizationRecord {
    let classification = Classification::of(so_type, link, &doc);
    VisualizationRecord {
        doc,
        so_type,
        app: origin.app.clone(),
        source: origin.source,
        link,
        dashboard,
        path: display_path(path),
        commit,
        manifest: Value::clone(&origin.manifest),
        classification,
        ownership: origin.ownership.clone(),
    }
}

/// Forward-slash path, stable across platforms.
fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Regular files of `dir` in file-name order. A missing folder is empty.
fn list_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Cannot read {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

/// Read and parse one saved-object file. Only JSON objects are documents.
fn read_document(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(|source| CensusError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_slice(&bytes).map_err(|source| CensusError::ParseDocument {
        path: path.to_path_buf(),
        source,
    })?;
    if !doc.is_object() {
        return Err(CensusError::ParseDocument {
            path: path.to_path_buf(),
            source: serde::de::Error::custom("saved object is not a JSON object"),
        });
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provenance::NoProvenance;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn write_json(dir: &Path, name: &str, value: &Value) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn walker() -> CorpusWalker {
        CorpusWalker::new(Config::default(), Box::new(NoProvenance)).unwrap()
    }

    #[test]
    fn test_list_files_sorted_and_missing() {
        let temp = tempdir().unwrap();
        assert!(list_files(&temp.path().join("absent")).is_empty());

        for name in ["b.json", "a.json", "c.json"] {
            fs::write(temp.path().join(name), "{}").unwrap();
        }
        fs::create_dir(temp.path().join("nested")).unwrap();
        let names: Vec<String> = list_files(temp.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
    }

    #[test]
    fn test_read_document_rejects_non_objects() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("array.json");
        fs::write(&path, "[1]").unwrap();
        assert!(matches!(
            read_document(&path),
            Err(CensusError::ParseDocument { .. })
        ));
    }

    #[test]
    fn test_dashboard_panels_and_standalone_lookup() {
        let temp = tempdir().unwrap();
        let kibana = temp.path().join("kibana");

        write_json(
            &kibana.join("dashboard"),
            "d1.json",
            &json!({
                "id": "d1",
                "attributes": {
                    "title": "Overview",
                    "panelsJSON": [
                        {"panelRefName": "panel_0"},
                        {"type": "lens", "embeddableConfig": {"attributes": {"title": "Inline"}}}
                    ]
                },
                "references": [{"id": "v1", "name": "panel_0", "type": "visualization"}]
            }),
        );
        write_json(
            &kibana.join("visualization"),
            "v1.json",
            &json!({"id": "v1", "attributes": {"title": "Linked", "visState": "{\"type\":\"line\"}"}}),
        );
        write_json(
            &kibana.join("visualization"),
            "v2.json",
            &json!({"id": "v2", "attributes": {"title": "Orphan"}}),
        );
        fs::write(kibana.join("visualization").join("broken.json"), "{oops").unwrap();

        let origin = PackageOrigin::integration("demo", Arc::new(json!({"name": "demo"})));
        let records = walker().process_kibana(&kibana, &origin, &SavedObjectType::ALL);

        assert_eq!(records.len(), 3);

        assert_eq!(records[0].link, LinkKind::ByValue);
        assert_eq!(records[0].so_type, SavedObjectType::Lens);
        assert_eq!(records[0].dashboard, "Overview");
        assert!(records[0].path.ends_with("dashboard/d1.json"));
        assert_eq!(records[0].classification.vis_title, "Inline");

        assert_eq!(records[1].link, LinkKind::ByReference);
        assert_eq!(records[1].dashboard, "Overview");
        assert_eq!(records[1].classification.vis_type, "line");
        assert!(records[1].path.ends_with("visualization/v1.json"));

        assert_eq!(records[2].dashboard, "");
        assert_eq!(records[2].classification.vis_title, "Orphan");
        assert_eq!(records[2].manifest, json!({"name": "demo"}));
    }

    #[test]
    fn test_encoded_panels_json() {
        let temp = tempdir().unwrap();
        let kibana = temp.path().join("kibana");
        let panels = json!([
            {"type": "visualization", "embeddableConfig": {"savedVis": {"type": "metrics", "params": {"type": "markdown"}, "title": "Notes"}}},
            {"type": "visualization", "embeddableConfig": {}}
        ]);
        write_json(
            &kibana.join("dashboard"),
            "legacy.json",
            &json!({"attributes": {"title": "Legacy", "panelsJSON": panels.to_string()}, "references": []}),
        );

        let origin = PackageOrigin::beat("metricbeat/module/system");
        let records = walker().process_kibana(&kibana, &origin, &[SavedObjectType::Visualization]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.source, SourceKind::Beat);
        assert_eq!(record.classification.vis_tsvb_type, "markdown");
        assert!(record.is_legacy());
        assert_eq!(record.manifest, Value::Null);
    }
}
