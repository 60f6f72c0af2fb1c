use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    // Entries table. AUTOINCREMENT keeps ids monotonic and never reused,
    // even across delete/clear. Images are stored inline as a JSON array
    // of data URIs.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            images TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    // Create indexes for entries
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at)",
        [],
    )?;

    Ok(())
}
