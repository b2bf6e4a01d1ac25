use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (notes)");
        let tx = conn.transaction()?;
        tx.execute_batch(
            "
            CREATE TABLE notes (
                id          TEXT PRIMARY KEY,
                name        TEXT,
                message     TEXT NOT NULL CHECK (length(message) > 0),
                status      TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
                ip_hash     TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_notes_status_created
                ON notes(status, created_at DESC);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
        tx.commit()?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_status_check_constraint() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();

        let res = conn.execute(
            "INSERT INTO notes (id, message, status, created_at) VALUES ('a', 'hi', 'deleted', '2026-01-01T00:00:00.000Z')",
            [],
        );
        assert!(res.is_err());
    }
}
