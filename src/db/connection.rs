use std::fs;
use std::path::Path;

use log::info;
use rusqlite::Connection;

use crate::error::{StoreContext, StoreResult};

/// Open (creating if needed) the SQLite file at `path` and make sure the schema
/// exists. The parent directory is created on first use.
pub fn open_database(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path).during("open database")?;
    initialize(&conn)?;
    info!("opened database at {}", path.display());
    Ok(conn)
}

/// Private in-memory database with the schema applied. Used by tests and by
/// anything that wants a throwaway store.
pub fn open_in_memory() -> StoreResult<Connection> {
    let conn = Connection::open_in_memory().during("open database")?;
    initialize(&conn)?;
    Ok(conn)
}

/// Create both tables when they are missing. Safe to run on every start: the
/// statements are no-ops against an existing schema.
pub fn initialize(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            fee REAL NOT NULL DEFAULT 100.0
        )",
        [],
    )
    .during("create students table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            description TEXT
        )",
        [],
    )
    .during("create lessons table")?;

    Ok(())
}
