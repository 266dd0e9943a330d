//! Document database operations.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Database, DbResult};

const UPSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = datetime('now')
"#;

impl Database {
    /// Insert or replace the document stored under `key`.
    pub fn put_document(&self, key: &str, json: &str) -> DbResult<()> {
        self.conn.execute(UPSERT_DOCUMENT, params![key, json])?;
        debug!(key, bytes = json.len(), "saved document");
        Ok(())
    }

    /// Insert or replace several documents in one transaction.
    /// Either all of them are written or none is.
    pub fn put_documents(&mut self, documents: &[(&str, String)]) -> DbResult<()> {
        let tx = self.transaction()?;
        for (key, json) in documents {
            tx.execute(UPSERT_DOCUMENT, params![key, json])?;
        }
        tx.commit()?;
        debug!(count = documents.len(), "saved documents");
        Ok(())
    }

    /// Get the raw document stored under `key`.
    pub fn get_document(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM documents WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Delete a document.
    pub fn delete_document(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM documents WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    /// List all stored keys.
    pub fn list_document_keys(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM documents ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Load a single value. A missing or unreadable document yields `None`.
    pub fn load_value<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        let Some(json) = self.get_document(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "stored document is malformed, ignoring it");
                Ok(None)
            }
        }
    }

    /// Load a collection of records.
    ///
    /// A missing or non-array document yields an empty list; individual
    /// records that fail to deserialize are skipped.
    pub fn load_records<T: DeserializeOwned>(&self, key: &str) -> DbResult<Vec<T>> {
        let Some(values) = self.load_value::<Vec<serde_json::Value>>(key)? else {
            return Ok(Vec::new());
        };

        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key, index, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect();

        debug!(key, loaded = records.len(), total, "loaded collection");
        Ok(records)
    }
}
