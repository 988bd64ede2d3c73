use anyhow::Result;
use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<()> {
    // Mirrors the hosted transcriptions table; unknown columns go to `extra` as JSON.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transcriptions (
            call_id TEXT PRIMARY KEY,
            duration REAL,
            cost REAL,
            assistant_name TEXT,
            script_id TEXT,
            result TEXT,
            created_at TEXT NOT NULL,
            extra TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transcriptions_created_at ON transcriptions(created_at)",
        [],
    )?;

    Ok(())
}
