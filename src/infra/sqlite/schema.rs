use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    Connection::open(db_path).with_context(|| format!("failed to open db: {}", db_path.display()))
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS table_cache (
            slot          INTEGER PRIMARY KEY CHECK (slot = 1),
            payload       TEXT NOT NULL,
            row_count     INTEGER NOT NULL,
            saved_at_ms   INTEGER NOT NULL,
            saved_online  INTEGER NOT NULL,
            source        TEXT NOT NULL DEFAULT '',
            fingerprint   INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
    .context("failed to initialize schema")?;

    conn.execute(
        "ALTER TABLE table_cache ADD COLUMN source TEXT NOT NULL DEFAULT ''",
        [],
    )
    .ok();
    conn.execute(
        "ALTER TABLE table_cache ADD COLUMN fingerprint INTEGER NOT NULL DEFAULT 0",
        [],
    )
    .ok();

    Ok(())
}
