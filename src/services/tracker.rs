use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::database::{EntryStore, StoreError};
use crate::models::{Entry, EntryDraft, EntryPatch, ImportedEntry, SelectedFile, Settings, StorageStats};
use crate::services::image_compressor;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write export file")]
    Export(#[source] std::io::Error),
    #[error("failed to read import file")]
    Import(#[source] std::io::Error),
    #[error("import file is not a valid entry collection")]
    ImportFormat(#[source] serde_json::Error),
}

/// Image payloads pending attachment to one in-progress add/edit. Owned by
/// exactly that workflow and discarded on cancel; nothing in here is
/// persisted until the entry is committed.
#[derive(Debug)]
pub struct StagingSession {
    id: Uuid,
    payloads: Vec<String>,
    labels: Vec<String>,
}

impl StagingSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            payloads: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Seed from an existing entry so an edit starts with its current images.
    fn seeded(entry: &Entry) -> Self {
        let mut session = Self::new();
        session.payloads = entry.images.clone();
        session.labels = (1..=entry.images.len())
            .map(|n| format!("Image {n}"))
            .collect();
        session
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Drop the staged image at `index`. Out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.payloads.len() {
            self.payloads.remove(index);
            self.labels.remove(index);
        }
    }

    pub fn into_payloads(self) -> Vec<String> {
        self.payloads
    }
}

/// Per-file result of staging a selection. Failures never abort the batch;
/// the remaining files are still processed.
#[derive(Debug)]
pub enum StageOutcome {
    Staged {
        file_name: String,
        compression_ratio: f64,
    },
    Skipped {
        file_name: String,
        reason: String,
    },
}

/// Orchestrates the entry lifecycle: wires commands to the store and the
/// image compressor, and keeps an in-memory copy of the collection in sync
/// with the store after every mutation.
pub struct TrackerController {
    store: EntryStore,
    entries: Vec<Entry>,
    settings: Settings,
    data_dir: PathBuf,
}

impl TrackerController {
    pub fn new(store: EntryStore, settings: Settings, data_dir: PathBuf) -> Self {
        Self {
            store,
            entries: Vec::new(),
            settings,
            data_dir,
        }
    }

    /// Reload the cached collection from the store.
    pub fn refresh(&mut self) -> Result<(), TrackerError> {
        self.entries = self.store.get_all()?;
        Ok(())
    }

    /// Cached entries, newest first. Valid until the next mutation.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: i64) -> Result<Option<Entry>, TrackerError> {
        Ok(self.store.get(id)?)
    }

    pub fn begin_staging(&self) -> StagingSession {
        StagingSession::new()
    }

    pub fn begin_staging_for(&self, entry: &Entry) -> StagingSession {
        StagingSession::seeded(entry)
    }

    /// Compress the selected files one at a time, in selection order, and
    /// append the survivors to the session. Non-image selections are rejected
    /// before the compressor runs; files that fail to decode are skipped
    /// while the rest of the batch continues.
    pub async fn stage_images(
        &self,
        session: &mut StagingSession,
        files: Vec<SelectedFile>,
    ) -> Vec<StageOutcome> {
        let mut outcomes = Vec::new();

        for file in files {
            if !file.content_type.starts_with("image/") {
                warn!("{} is not an image file, skipping", file.name);
                outcomes.push(StageOutcome::Skipped {
                    file_name: file.name,
                    reason: "not an image file".to_string(),
                });
                continue;
            }

            let file_name = file.name.clone();
            let settings = self.settings.compression.clone();
            // Compression is CPU-bound; keep it off the async runtime.
            let result = tokio::task::spawn_blocking(move || {
                image_compressor::compress(&file.bytes, &file.name, &settings)
            })
            .await;

            match result {
                Ok(Ok(compressed)) => {
                    info!(
                        "session {}: compressed {} ({}% reduction)",
                        session.id, compressed.file_name, compressed.compression_ratio
                    );
                    session.payloads.push(compressed.data_url);
                    session.labels.push(format!("{} (compressed)", compressed.file_name));
                    outcomes.push(StageOutcome::Staged {
                        file_name: compressed.file_name,
                        compression_ratio: compressed.compression_ratio,
                    });
                }
                Ok(Err(err)) => {
                    warn!("session {}: skipping {file_name}: {err}", session.id);
                    outcomes.push(StageOutcome::Skipped {
                        file_name,
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!("session {}: compression task failed for {file_name}: {err}", session.id);
                    outcomes.push(StageOutcome::Skipped {
                        file_name,
                        reason: "compression task failed".to_string(),
                    });
                }
            }
        }

        outcomes
    }

    /// Commit a new entry with the session's staged images. The session is
    /// consumed either way; a failed write leaves nothing staged.
    pub async fn add_entry(
        &mut self,
        date: &str,
        description: &str,
        session: StagingSession,
    ) -> Result<i64, TrackerError> {
        if date.trim().is_empty() || description.trim().is_empty() {
            return Err(TrackerError::InvalidInput(
                "date and description are required".to_string(),
            ));
        }

        let draft = EntryDraft {
            date: date.to_string(),
            description: description.to_string(),
            images: session.into_payloads(),
        };

        match self.store.add(&draft) {
            Ok(id) => {
                self.refresh()?;
                info!("added entry {id}");
                Ok(id)
            }
            Err(err) => {
                self.resync_after_failure();
                Err(err.into())
            }
        }
    }

    pub async fn update_entry(&mut self, id: i64, patch: EntryPatch) -> Result<i64, TrackerError> {
        if patch.date.as_deref().is_some_and(|d| d.trim().is_empty())
            || patch
                .description
                .as_deref()
                .is_some_and(|d| d.trim().is_empty())
        {
            return Err(TrackerError::InvalidInput(
                "date and description cannot be blank".to_string(),
            ));
        }

        match self.store.update(id, &patch) {
            Ok(id) => {
                self.refresh()?;
                info!("updated entry {id}");
                Ok(id)
            }
            Err(err) => {
                self.resync_after_failure();
                Err(err.into())
            }
        }
    }

    pub async fn delete_entry(&mut self, id: i64) -> Result<(), TrackerError> {
        match self.store.delete(id) {
            Ok(()) => {
                self.refresh()?;
                info!("deleted entry {id}");
                Ok(())
            }
            Err(err) => {
                self.resync_after_failure();
                Err(err.into())
            }
        }
    }

    pub async fn clear_all(&mut self) -> Result<(), TrackerError> {
        match self.store.clear() {
            Ok(()) => {
                self.refresh()?;
                info!("cleared all entries");
                Ok(())
            }
            Err(err) => {
                self.resync_after_failure();
                Err(err.into())
            }
        }
    }

    /// Serialize the full collection (newest first) to a JSON file. Without
    /// an explicit path the export lands under `<data_dir>/exports/`.
    pub async fn export_to_file(
        &self,
        path: Option<PathBuf>,
    ) -> Result<(PathBuf, usize), TrackerError> {
        let entries = self.store.export_all()?;

        let path = path.unwrap_or_else(|| {
            self.data_dir.join("exports").join(format!(
                "worklog_entries_{}.json",
                Utc::now().format("%Y-%m-%d")
            ))
        });
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(TrackerError::Export)?;
        }

        let payload = serde_json::to_string_pretty(&entries)
            .map_err(std::io::Error::other)
            .map_err(TrackerError::Export)?;
        fs::write(&path, payload).map_err(TrackerError::Export)?;

        info!("exported {} entries to {}", entries.len(), path.display());
        Ok((path, entries.len()))
    }

    /// Destructive replace: everything currently stored is discarded in
    /// favor of the file's records. Callers must confirm with the user
    /// before invoking this.
    pub async fn import_from_file(&mut self, path: &Path) -> Result<usize, TrackerError> {
        let payload = fs::read_to_string(path).map_err(TrackerError::Import)?;
        let records: Vec<ImportedEntry> =
            serde_json::from_str(&payload).map_err(TrackerError::ImportFormat)?;

        match self.store.import_all(&records) {
            Ok(count) => {
                self.refresh()?;
                info!("imported {count} entries, previous data replaced");
                Ok(count)
            }
            Err(err) => {
                self.resync_after_failure();
                Err(err.into())
            }
        }
    }

    pub fn storage_stats(&self) -> StorageStats {
        let estimate = self.store.estimate_usage();
        let entry_count = self.store.count().unwrap_or(self.entries.len());
        StorageStats {
            used_bytes: estimate.used_bytes,
            quota_bytes: estimate.quota_bytes,
            entry_count,
        }
    }

    // The cache must never drift from the store after a failed write.
    fn resync_after_failure(&mut self) {
        if let Err(err) = self.refresh() {
            warn!("cache re-sync after failed write also failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use rusqlite::Connection;
    use std::io::Cursor;

    fn make_tracker() -> TrackerController {
        let conn = Connection::open_in_memory().expect("in-memory database");
        schema::create_tables(&conn).expect("schema");
        let store = EntryStore::new(conn, PathBuf::new());
        let data_dir = std::env::temp_dir().join(format!("worklog-test-{}", Uuid::new_v4()));
        TrackerController::new(store, Settings::default(), data_dir)
    }

    fn png_file(name: &str, width: u32, height: u32) -> SelectedFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 60]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encode");
        SelectedFile {
            name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    #[tokio::test]
    async fn staging_rejects_non_image_files_before_compression() {
        let tracker = make_tracker();
        let mut session = tracker.begin_staging();

        let file = SelectedFile {
            name: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        let outcomes = tracker.stage_images(&mut session, vec![file]).await;

        assert!(session.is_empty());
        assert!(matches!(
            &outcomes[0],
            StageOutcome::Skipped { reason, .. } if reason == "not an image file"
        ));
    }

    #[tokio::test]
    async fn staging_skips_undecodable_files_and_continues() {
        let tracker = make_tracker();
        let mut session = tracker.begin_staging();

        let broken = SelectedFile {
            name: "broken.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: b"not actually pixels".to_vec(),
        };
        let files = vec![broken, png_file("ok.png", 40, 30)];
        let outcomes = tracker.stage_images(&mut session, files).await;

        assert_eq!(session.len(), 1);
        assert!(matches!(outcomes[0], StageOutcome::Skipped { .. }));
        assert!(matches!(outcomes[1], StageOutcome::Staged { .. }));
        assert_eq!(session.labels(), ["ok.png (compressed)"]);
    }

    #[tokio::test]
    async fn add_entry_persists_staged_images_and_refreshes_cache() {
        let mut tracker = make_tracker();
        tracker.refresh().unwrap();

        let mut session = tracker.begin_staging();
        tracker
            .stage_images(&mut session, vec![png_file("yard.png", 40, 30)])
            .await;

        let id = tracker
            .add_entry("2024-01-05", "Orientation day", session)
            .await
            .unwrap();

        assert_eq!(tracker.entries().len(), 1);
        let entry = &tracker.entries()[0];
        assert_eq!(entry.id, id);
        assert_eq!(entry.images.len(), 1);
        assert!(entry.images[0].starts_with("data:image/jpeg;base64,"));
        assert_eq!(tracker.storage_stats().entry_count, 1);
    }

    #[tokio::test]
    async fn add_entry_rejects_missing_fields() {
        let mut tracker = make_tracker();
        let session = tracker.begin_staging();

        let err = tracker.add_entry("2024-01-05", "  ", session).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(tracker.entries().is_empty());
    }

    #[tokio::test]
    async fn edit_staging_starts_from_existing_images_and_supports_removal() {
        let mut tracker = make_tracker();

        let mut session = tracker.begin_staging();
        tracker
            .stage_images(
                &mut session,
                vec![png_file("a.png", 20, 20), png_file("b.png", 20, 20)],
            )
            .await;
        let id = tracker.add_entry("2024-01-05", "Two pictures", session).await.unwrap();

        let entry = tracker.entry(id).unwrap().unwrap();
        let mut edit_session = tracker.begin_staging_for(&entry);
        assert_eq!(edit_session.len(), 2);

        edit_session.remove(0);
        assert_eq!(edit_session.len(), 1);

        let patch = EntryPatch {
            images: Some(edit_session.into_payloads()),
            ..EntryPatch::default()
        };
        tracker.update_entry(id, patch).await.unwrap();

        let updated = tracker.entry(id).unwrap().unwrap();
        assert_eq!(updated.images.len(), 1);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.description, "Two pictures");
    }

    #[tokio::test]
    async fn delete_and_clear_keep_cache_in_sync() {
        let mut tracker = make_tracker();

        let first = tracker
            .add_entry("2024-01-05", "First", tracker.begin_staging())
            .await
            .unwrap();
        tracker
            .add_entry("2024-01-06", "Second", tracker.begin_staging())
            .await
            .unwrap();
        assert_eq!(tracker.entries().len(), 2);

        tracker.delete_entry(first).await.unwrap();
        assert_eq!(tracker.entries().len(), 1);

        tracker.clear_all().await.unwrap();
        assert!(tracker.entries().is_empty());
    }

    #[tokio::test]
    async fn export_then_import_round_trips_through_a_file() {
        let mut tracker = make_tracker();

        let mut session = tracker.begin_staging();
        tracker
            .stage_images(&mut session, vec![png_file("site.png", 40, 30)])
            .await;
        tracker.add_entry("2024-01-05", "Orientation day", session).await.unwrap();
        tracker
            .add_entry("2024-01-06", "First assignment", tracker.begin_staging())
            .await
            .unwrap();

        let (path, exported) = tracker.export_to_file(None).await.unwrap();
        assert_eq!(exported, 2);

        let imported = tracker.import_from_file(&path).await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(tracker.entries().len(), 2);

        let descriptions: Vec<&str> = tracker
            .entries()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert!(descriptions.contains(&"Orientation day"));
        assert!(descriptions.contains(&"First assignment"));

        let _ = fs::remove_dir_all(&tracker.data_dir);
    }

    #[tokio::test]
    async fn import_replaces_current_data() {
        let mut tracker = make_tracker();

        tracker
            .add_entry("2024-01-05", "Old data", tracker.begin_staging())
            .await
            .unwrap();
        let (path, _) = tracker.export_to_file(None).await.unwrap();

        tracker
            .add_entry("2024-01-06", "Added after export", tracker.begin_staging())
            .await
            .unwrap();
        assert_eq!(tracker.entries().len(), 2);

        tracker.import_from_file(&path).await.unwrap();
        assert_eq!(tracker.entries().len(), 1);
        assert_eq!(tracker.entries()[0].description, "Old data");

        let _ = fs::remove_dir_all(&tracker.data_dir);
    }
}
