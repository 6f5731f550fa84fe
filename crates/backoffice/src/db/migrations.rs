//! Schema steps for the key-value database.
//!
//! The schema version lives in `PRAGMA user_version`. Step `n` (1-based)
//! runs once, inside its own transaction, when the stored version is below `n`.

use rusqlite::Connection;

use super::error::DatabaseError;

/// `(name, sql)` pairs in the order they must run. Append only.
const STEPS: &[(&str, &str)] = &[
    (
        "create_kv_entries",
        "CREATE TABLE IF NOT EXISTS kv_entries (
            namespace TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (namespace, key)
        );",
    ),
    (
        "index_kv_entries_updated_at",
        "CREATE INDEX IF NOT EXISTS idx_kv_entries_updated_at ON kv_entries(namespace, updated_at);",
    ),
];

pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

/// Brings the schema up to [`latest_version`].
pub fn run_all(conn: &mut Connection) -> Result<(), DatabaseError> {
    let from = current_version(conn)?;
    if from > latest_version() {
        return Err(DatabaseError::UnknownVersion {
            found: from,
            latest: latest_version(),
        });
    }

    for (index, (name, sql)) in STEPS.iter().enumerate().skip(from as usize) {
        let version = index as u32 + 1;
        log::debug!("Applying schema step {} ({})", version, name);
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .and_then(|_| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DatabaseError::Migration {
                version,
                name,
                source,
            })?;
        tx.commit()?;
    }

    if from < latest_version() {
        log::info!("Database schema at v{} (was v{})", latest_version(), from);
    }
    Ok(())
}
