/// Record output.
///
/// A census run ends by handing its records to a [`RecordSink`]. The JSON
/// file sink is what the CLI uses; [`read_records`] loads such a file back
/// for comparisons between runs.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::record::VisualizationRecord;

/// Destination for collected records.
pub trait RecordSink {
    fn write(&mut self, records: &[VisualizationRecord]) -> Result<()>;
}

/// Writes records as one pretty-printed JSON array, replacing the file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn write(&mut self, records: &[VisualizationRecord]) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let data = serde_json::to_string_pretty(records).context("failed to serialize records")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<VisualizationRecord>,
}

impl RecordSink for MemorySink {
    fn write(&mut self, records: &[VisualizationRecord]) -> Result<()> {
        self.records.extend_from_slice(records);
        Ok(())
    }
}

/// Read a result file written by [`JsonFileSink`].
pub fn read_records(path: &Path) -> Result<Vec<VisualizationRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read result file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid result file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::ownership::Ownership;
    use crate::record::{CommitInfo, LinkKind, SavedObjectType, SourceKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> VisualizationRecord {
        VisualizationRecord {
            doc: json!({"id": "v1", "attributes": {"title": "Requests"}}),
            so_type: SavedObjectType::Visualization,
            app: "nginx".to_string(),
            source: SourceKind::Integration,
            link: LinkKind::ByReference,
            dashboard: "Overview".to_string(),
            path: "packages/nginx/kibana/visualization/v1.json".to_string(),
            commit: CommitInfo {
                hash: "abc".to_string(),
                author: "A <a@b>".to_string(),
                date: None,
            },
            manifest: json!({"name": "nginx"}),
            classification: Classification {
                vis_type: "line".to_string(),
                vis_tsvb_type: String::new(),
                vis_title: "Requests".to_string(),
                is_legacy: true,
            },
            ownership: Ownership {
                gh_owner: "elastic/obs".to_string(),
                owning_group: "obs".to_string(),
            },
        }
    }

    #[test]
    fn test_json_sink_replaces_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("out").join("result.json");
        let mut sink = JsonFileSink::new(&path);

        sink.write(&[sample(), sample()]).unwrap();
        sink.write(&[sample()]).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records, vec![sample()]);
    }

    #[test]
    fn test_json_sink_writes_array() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("result.json");
        JsonFileSink::new(&path).write(&[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_read_records_invalid() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("result.json");
        fs::write(&path, "{}").unwrap();
        assert!(read_records(&path).is_err());
        assert!(read_records(&temp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        sink.write(&[sample()]).unwrap();
        sink.write(&[sample()]).unwrap();
        assert_eq!(sink.records.len(), 2);
    }
}
