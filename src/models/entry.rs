use serde::{Deserialize, Serialize};

/// One persisted logbook record. Serializes to the camelCase export shape:
/// `{id, date, description, images[], createdAt, updatedAt?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub images: Vec<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Caller-supplied fields for a new entry. The store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: String,
    pub description: String,
    pub images: Vec<String>,
}

/// Partial update for an existing entry. `None` fields are retained as-is.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub date: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Shape accepted on import. Any `id` or `createdAt` carried over from a
/// previous export is ignored so the store can assign fresh values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEntry {
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
