use rusqlite::Connection;

use crate::Result;

// Bump when the kv table definition changes
pub const SCHEMA_VERSION: i32 = 1;

// NOTE: the store keeps whole JSON documents under a handful of keys
// ("logs", "tabs"). SQLite only provides durability and atomic multi-key
// writes; all structure lives in the documents.

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        if current_version != 0 {
            tracing::warn!(
                found = current_version,
                expected = SCHEMA_VERSION,
                "storage schema version changed, recreating"
            );
        }
        conn.execute_batch("DROP TABLE IF EXISTS kv;")?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_sets_user_version() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_version_mismatch_drops_old_rows() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute("INSERT INTO kv (key, value) VALUES ('logs', '{}')", [])
            .unwrap();
        conn.execute("PRAGMA user_version = 99", []).unwrap();

        init_schema(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute("INSERT INTO kv (key, value) VALUES ('tabs', '{}')", [])
            .unwrap();
        init_schema(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
