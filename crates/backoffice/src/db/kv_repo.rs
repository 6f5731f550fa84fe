//! Key-value repository over the `kv_entries` table.

use rusqlite::{params, OptionalExtension};

use super::{Database, DatabaseError};

/// Reads the raw value stored under `key`.
pub fn get(db: &Database, namespace: &str, key: &str) -> Result<Option<String>, DatabaseError> {
    db.with_conn(|conn| {
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    })
}

/// Inserts or replaces the value under `key`.
pub fn put(db: &Database, namespace: &str, key: &str, value: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![namespace, key, value],
        )?;
        Ok(())
    })
}

/// Deletes `key`. Returns whether a row was removed.
pub fn delete(db: &Database, namespace: &str, key: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2",
            params![namespace, key],
        )?;
        Ok(affected > 0)
    })
}

/// All keys in a namespace, sorted.
pub fn keys(db: &Database, namespace: &str) -> Result<Vec<String>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT key FROM kv_entries WHERE namespace = ?1 ORDER BY key")?;
        let rows = stmt
            .query_map(params![namespace], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    })
}
