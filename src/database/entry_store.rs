use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

use super::StoreError;
use crate::models::{Entry, EntryDraft, EntryPatch, ImportedEntry, StorageEstimate};

/// Durable CRUD over the entry collection, backed by one SQLite connection.
///
/// Every mutation is a single implicit transaction; callers are expected not
/// to overlap operations against the same record, which the sequential
/// command flow guarantees.
pub struct EntryStore {
    conn: Connection,
    db_path: PathBuf,
}

impl EntryStore {
    pub fn new(conn: Connection, db_path: PathBuf) -> Self {
        Self { conn, db_path }
    }

    /// Persist a new entry. The store assigns `id` and `created_at`; the
    /// caller never chooses either.
    pub fn add(&self, draft: &EntryDraft) -> Result<i64, StoreError> {
        let created_at = Utc::now().to_rfc3339();
        let id = self.insert_record(
            &draft.date,
            &draft.description,
            &draft.images,
            &created_at,
            None,
        )?;
        debug!("added entry {id}");
        Ok(id)
    }

    /// All live entries, newest first. Ties on `created_at` fall back to the
    /// higher id, so the order is total.
    pub fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, date, description, images, created_at, updated_at
                 FROM entries
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(StoreError::Read)?;

        let entries = stmt
            .query_map([], row_to_entry)
            .map_err(StoreError::Read)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Read)?;

        Ok(entries)
    }

    /// A missing id is not an error; callers must check the option.
    pub fn get(&self, id: i64) -> Result<Option<Entry>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, date, description, images, created_at, updated_at
                 FROM entries WHERE id = ?1",
                [id],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::Read)
    }

    /// Shallow-merge `patch` over the stored record. `id` and `created_at`
    /// are immutable; `updated_at` is set to now on every call.
    pub fn update(&self, id: i64, patch: &EntryPatch) -> Result<i64, StoreError> {
        let existing = self.get(id)?.ok_or(StoreError::NotFound(id))?;

        let date = patch.date.as_ref().unwrap_or(&existing.date);
        let description = patch.description.as_ref().unwrap_or(&existing.description);
        let images = patch.images.as_ref().unwrap_or(&existing.images);
        let images_json = serde_json::to_string(images).map_err(StoreError::Serialize)?;
        let updated_at = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "UPDATE entries SET date = ?1, description = ?2, images = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![date, description, images_json, updated_at, id],
            )
            .map_err(StoreError::Write)?;

        debug!("updated entry {id}");
        Ok(id)
    }

    /// Idempotent: deleting an id that is already gone succeeds.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM entries WHERE id = ?1", [id])
            .map_err(StoreError::Write)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM entries", [])
            .map_err(StoreError::Write)?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(StoreError::Read)?;
        Ok(count as usize)
    }

    /// Full collection in `get_all()` order, for serialization.
    pub fn export_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.get_all()
    }

    /// Destructive replace: clears the store, then adds the supplied records
    /// in input order with fresh ids and creation timestamps. The first
    /// failing record aborts the rest and is named in the error.
    pub fn import_all(&self, records: &[ImportedEntry]) -> Result<usize, StoreError> {
        self.clear()?;

        for (index, record) in records.iter().enumerate() {
            let created_at = Utc::now().to_rfc3339();
            self.insert_record(
                &record.date,
                &record.description,
                &record.images,
                &created_at,
                record.updated_at.as_deref(),
            )
            .map_err(|source| StoreError::Import {
                index,
                source: Box::new(source),
            })?;
        }

        Ok(records.len())
    }

    /// Best-effort usage from the database file sizes. There is no quota to
    /// report for a local file, so `quota_bytes` stays 0.
    pub fn estimate_usage(&self) -> StorageEstimate {
        let wal_path = self.db_path.with_extension("db-wal");
        let used_bytes = file_size(&self.db_path) + file_size(&wal_path);
        StorageEstimate {
            used_bytes,
            quota_bytes: 0,
        }
    }

    fn insert_record(
        &self,
        date: &str,
        description: &str,
        images: &[String],
        created_at: &str,
        updated_at: Option<&str>,
    ) -> Result<i64, StoreError> {
        let images_json = serde_json::to_string(images).map_err(StoreError::Serialize)?;

        self.conn
            .execute(
                "INSERT INTO entries (date, description, images, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![date, description, images_json, created_at, updated_at],
            )
            .map_err(StoreError::Write)?;

        Ok(self.conn.last_insert_rowid())
    }
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
    let images_json: Option<String> = row.get(3)?;
    let images: Vec<String> = images_json
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();

    Ok(Entry {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        images,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn file_size(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
