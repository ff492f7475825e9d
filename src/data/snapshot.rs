//! Snapshot document loading.
//!
//! A snapshot is the JSON payload a library export produces:
//!
//! ```json
//! { "kind": "tracks",
//!   "records": [ { "attributes": { "data-track": "...", "data-energy": "0.8" },
//!                  "detail": { "sections": [], "raw": {} } } ] }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::detail::{DetailPayload, DetailRegistry};
use super::models::{Field, FieldValue, Record, RecordKey, RecordKind};
use super::store::RecordStore;

/// Snapshot loading errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    kind: RecordKind,
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    detail: Option<DetailPayload>,
}

/// A loaded snapshot: the record store plus its detail registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub store: RecordStore,
    pub details: DetailRegistry,
    pub source: Option<PathBuf>,
}

/// Load progress reported while a snapshot is prepared.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgress {
    /// 0-100
    pub percent: u8,
    pub status: String,
}

impl LoadProgress {
    fn new(percent: u8, status: impl Into<String>) -> Self {
        Self {
            percent,
            status: status.into(),
        }
    }

    /// Processing stage: 20% to 80% as records are processed.
    fn processing(processed: usize, total: usize, noun: &str) -> Self {
        let share = if total == 0 {
            60
        } else {
            (60.0 * processed as f64 / total as f64).round() as u8
        };
        Self::new(
            20 + share,
            format!("Processing {} ({}/{})...", noun, processed, total),
        )
    }
}

/// Read and prepare a snapshot file, reporting progress as it goes.
pub async fn load<F>(path: &Path, chunk_size: usize, progress: F) -> Result<Snapshot, SnapshotError>
where
    F: FnMut(LoadProgress),
{
    let mut progress = progress;
    progress(LoadProgress::new(10, "Initializing..."));

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut snapshot = build(&contents, chunk_size, progress).await?;
    snapshot.source = Some(path.to_path_buf());

    info!(
        "Loaded {} {} from {}",
        snapshot.store.len(),
        snapshot.store.kind().noun(),
        path.display()
    );
    Ok(snapshot)
}

/// Parse a snapshot document and convert its records in bounded chunks,
/// yielding between chunks so the event loop stays responsive.
pub async fn build<F>(contents: &str, chunk_size: usize, mut progress: F) -> Result<Snapshot, SnapshotError>
where
    F: FnMut(LoadProgress),
{
    let document: SnapshotDocument = serde_json::from_str(contents)?;
    let kind = document.kind;
    let noun = kind.noun();
    let total = document.records.len();
    let chunk_size = chunk_size.max(1);

    progress(LoadProgress::new(
        20,
        format!("Processing {} {}...", total, noun),
    ));

    let mut records = Vec::with_capacity(total);
    let mut details = DetailRegistry::new();
    let mut raw_records = document.records.into_iter();

    loop {
        let chunk: Vec<RawRecord> = raw_records.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }

        for raw in chunk {
            let key = RecordKey(records.len());
            if let Some(detail) = raw.detail {
                details.insert(key, detail);
            }
            records.push(convert_record(key, raw.attributes));
        }

        progress(LoadProgress::processing(records.len(), total, noun));
        tokio::task::yield_now().await;
    }

    progress(LoadProgress::new(80, "Preparing visualization..."));
    let store = RecordStore::new(kind, records);
    progress(LoadProgress::new(90, "Building charts..."));
    progress(LoadProgress::new(100, "Complete!"));

    Ok(Snapshot {
        store,
        details,
        source: None,
    })
}

fn convert_record(key: RecordKey, attributes: BTreeMap<String, serde_json::Value>) -> Record {
    let mut fields = BTreeMap::new();
    for (name, value) in attributes {
        let Some(field) = Field::from_attribute(&name) else {
            debug!("Ignoring unknown attribute {:?} on record {}", name, key);
            continue;
        };
        if matches!(field, Field::Position | Field::ReleaseYear) {
            warn!("Attribute {:?} on record {} is derived, ignoring", name, key);
            continue;
        }
        if let Some(value) = FieldValue::from_json(value) {
            fields.insert(field, value);
        }
    }
    Record::new(key, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "kind": "tracks",
        "records": [
            { "attributes": { "data-track": "Alpha", "data-energy": "0.8", "uri": "x" },
              "detail": { "sections": [ { "title": "Track", "entries": [ { "label": "Id", "value": "a1" } ] } ] } },
            { "attributes": { "track": "Beta", "energy": "loud", "genres": null } }
        ]
    }"#;

    #[tokio::test]
    async fn test_build_snapshot() {
        let snapshot = build(DOCUMENT, 50, |_| {}).await.unwrap();

        assert_eq!(snapshot.store.kind(), RecordKind::Tracks);
        assert_eq!(snapshot.store.len(), 2);
        assert_eq!(snapshot.details.len(), 1);

        let beta = snapshot.store.get(RecordKey(1)).unwrap();
        assert_eq!(beta.name(), "Beta");
        assert_eq!(beta.number(Field::Energy), None);
        assert!(beta.value(Field::Genres).is_none());
    }

    #[tokio::test]
    async fn test_chunked_progress() {
        let records: Vec<String> = (0..120)
            .map(|i| format!(r#"{{ "attributes": {{ "name": "Artist {}" }} }}"#, i))
            .collect();
        let document = format!(r#"{{ "kind": "artists", "records": [{}] }}"#, records.join(","));

        let mut reports = Vec::new();
        let snapshot = build(&document, 50, |p| reports.push(p.percent)).await.unwrap();

        assert_eq!(snapshot.store.len(), 120);
        // 20 on start, three chunks (50, 100, 120), then the final stages
        assert_eq!(reports, vec![20, 45, 70, 80, 80, 90, 100]);
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let mut reports = Vec::new();
        let snapshot = build(r#"{ "kind": "saved_tracks" }"#, 50, |p| reports.push(p.percent))
            .await
            .unwrap();

        assert!(snapshot.store.is_empty());
        assert_eq!(reports, vec![20, 80, 90, 100]);
    }

    #[tokio::test]
    async fn test_invalid_document() {
        let result = build("{ not json", 50, |_| {}).await;
        assert!(matches!(result, Err(SnapshotError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = load(Path::new("/nonexistent/spiffy/snapshot.json"), 50, |_| {}).await;
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }
}
