use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::prefs::schema::{init_prefs_db, open_connection};
use crate::usecase::ports::prefs::PrefsStore;

pub fn load_pref(db_path: &Path, page: &str, key: &str) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT value FROM ui_pref WHERE page = ?1 AND key = ?2",
        params![page, key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .context("failed to query ui pref")
}

pub fn upsert_pref(db_path: &Path, page: &str, key: &str, value: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO ui_pref(page, key, value, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(page, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![page, key, value],
    )
    .context("failed to upsert ui pref")?;
    Ok(())
}

pub fn delete_pref(db_path: &Path, page: &str, key: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "DELETE FROM ui_pref WHERE page = ?1 AND key = ?2",
        params![page, key],
    )
    .context("failed to delete ui pref")?;
    Ok(())
}

/// SQLite-backed preference store. Every failure is logged and swallowed:
/// preferences are a convenience and must never take a page down, including
/// when the data directory is read-only or out of quota.
pub struct SqlitePrefs {
    pub db_path: PathBuf,
}

impl PrefsStore for SqlitePrefs {
    fn init(&self) {
        if let Err(err) = init_prefs_db(&self.db_path) {
            tracing::warn!(%err, "preference storage unavailable, continuing without persistence");
        }
    }

    fn load(&self, page: &str, key: &str) -> Option<String> {
        match load_pref(&self.db_path, page, key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(page, key, %err, "failed to load ui pref");
                None
            }
        }
    }

    fn save(&self, page: &str, key: &str, value: &str) {
        if let Err(err) = upsert_pref(&self.db_path, page, key, value) {
            tracing::warn!(page, key, %err, "failed to save ui pref");
        }
    }

    fn remove(&self, page: &str, key: &str) {
        if let Err(err) = delete_pref(&self.db_path, page, key) {
            tracing::warn!(page, key, %err, "failed to remove ui pref");
        }
    }
}
