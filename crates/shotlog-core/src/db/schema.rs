//! SQLite schema definition.

/// Complete database schema for shotlog.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Documents (one JSON document per collection, rewritten in full on save)
-- ============================================================================

CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_key_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO documents (key, value) VALUES (?, ?)",
            ["schedules", "[]"],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO documents (key, value) VALUES (?, ?)",
            ["schedules", "[]"],
        );
        assert!(result.is_err());
    }
}
