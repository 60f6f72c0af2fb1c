use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

pub mod entry_store;
pub mod schema;

pub use entry_store::EntryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or migrated. Fatal for the session.
    #[error("entry store unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),
    #[error("failed to read from the entry store")]
    Read(#[source] rusqlite::Error),
    #[error("failed to write to the entry store")]
    Write(#[source] rusqlite::Error),
    #[error("failed to encode image payload for storage")]
    Serialize(#[source] serde_json::Error),
    #[error("entry {0} not found")]
    NotFound(i64),
    #[error("import failed at record {index}")]
    Import {
        index: usize,
        #[source]
        source: Box<StoreError>,
    },
}

pub fn init_database(db_path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(db_path).map_err(StoreError::Unavailable)?;

    // Enable WAL mode
    conn.pragma_update(None, "journal_mode", &"WAL")
        .map_err(StoreError::Unavailable)?;
    conn.pragma_update(None, "synchronous", &"NORMAL")
        .map_err(StoreError::Unavailable)?;

    // Create schema
    schema::create_tables(&conn).map_err(StoreError::Unavailable)?;

    Ok(conn)
}
