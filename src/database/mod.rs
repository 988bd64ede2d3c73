use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub mod queries;
pub mod schema;

pub use queries::SqliteSource;

pub fn init_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    conn.pragma_update(None, "journal_mode", &"WAL")?;
    conn.pragma_update(None, "synchronous", &"NORMAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}
