use folio_types::models::NoteStatus;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{NewNote, NoteRow};
use crate::{Database, Result};

const NOTE_COLUMNS: &str = "id, name, message, status, ip_hash, created_at";

impl Database {
    // -- Notes --

    /// Insert a submitted note as `pending`.
    pub fn insert_note(&self, note: &NewNote) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notes (id, name, message, status, ip_hash, created_at)
                 VALUES (?1, ?2, ?3, 'pending', ?4, ?5)",
                rusqlite::params![note.id, note.name, note.message, note.ip_hash, note.created_at],
            )?;
            debug!("Inserted note {}", note.id);
            Ok(())
        })
    }

    /// Notes with the given status, newest first, at most `limit` rows.
    pub fn list_notes_by_status(&self, status: NoteStatus, limit: u32) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes_by_status(conn, status, limit))
    }

    pub fn get_note(&self, id: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| query_note_by_id(conn, id))
    }

    /// Set a note's status unless it already has it. Returns the number of
    /// rows changed: 0 for an unknown id or a note already in `status`.
    pub fn update_note_status(&self, id: &str, status: NoteStatus) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET status = ?1 WHERE id = ?2 AND status != ?1",
                rusqlite::params![status.as_str(), id],
            )?;
            Ok(changed)
        })
    }
}

type RawNote = (String, Option<String>, String, String, Option<String>, String);

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawNote> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_note((id, name, message, status, ip_hash, created_at): RawNote) -> Result<NoteRow> {
    Ok(NoteRow {
        id,
        name,
        message,
        status: status.parse()?,
        ip_hash,
        created_at,
    })
}

fn query_notes_by_status(conn: &Connection, status: NoteStatus, limit: u32) -> Result<Vec<NoteRow>> {
    // rowid breaks ties between notes created in the same millisecond
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTE_COLUMNS}
         FROM notes
         WHERE status = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2"
    ))?;

    let raw = stmt
        .query_map(rusqlite::params![status.as_str(), limit], read_raw)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter().map(into_note).collect()
}

fn query_note_by_id(conn: &Connection, id: &str) -> Result<Option<NoteRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"))?;

    stmt.query_row([id], read_raw)
        .optional()?
        .map(into_note)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;
    use chrono::{Duration, SecondsFormat, Utc};
    use uuid::Uuid;

    fn new_note(message: &str, minutes_ago: i64) -> NewNote {
        NewNote {
            id: Uuid::new_v4().to_string(),
            name: None,
            message: message.to_string(),
            ip_hash: Some("abc123".into()),
            created_at: (Utc::now() - Duration::minutes(minutes_ago))
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    #[test]
    fn test_insert_is_pending() {
        let db = Database::open_in_memory().unwrap();
        let note = new_note("hello there", 0);
        db.insert_note(&note).unwrap();

        let row = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(row.status, NoteStatus::Pending);
        assert_eq!(row.message, "hello there");
        assert_eq!(row.ip_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_insert_duplicate_id() {
        let db = Database::open_in_memory().unwrap();
        let note = new_note("first", 0);
        db.insert_note(&note).unwrap();

        let err = db.insert_note(&note).unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)), "got {err:?}");
    }

    #[test]
    fn test_insert_empty_message() {
        let db = Database::open_in_memory().unwrap();
        let err = db.insert_note(&new_note("", 0)).unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)), "got {err:?}");
        assert!(db.list_notes_by_status(NoteStatus::Pending, 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_orders_newest_first_and_limits() {
        let db = Database::open_in_memory().unwrap();
        let old = new_note("old", 30);
        let mid = new_note("mid", 20);
        let new = new_note("new", 10);
        // insertion order differs from creation order on purpose
        db.insert_note(&mid).unwrap();
        db.insert_note(&new).unwrap();
        db.insert_note(&old).unwrap();

        let rows = db.list_notes_by_status(NoteStatus::Pending, 10).unwrap();
        let messages: Vec<_> = rows.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["new", "mid", "old"]);

        let rows = db.list_notes_by_status(NoteStatus::Pending, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "new");
    }

    #[test]
    fn test_list_filters_by_status() {
        let db = Database::open_in_memory().unwrap();
        let a = new_note("approved one", 5);
        let p = new_note("pending one", 4);
        db.insert_note(&a).unwrap();
        db.insert_note(&p).unwrap();
        db.update_note_status(&a.id, NoteStatus::Approved).unwrap();

        let approved = db.list_notes_by_status(NoteStatus::Approved, 10).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);

        assert!(db.list_notes_by_status(NoteStatus::Rejected, 10).unwrap().is_empty());
    }

    #[test]
    fn test_update_status_counts() {
        let db = Database::open_in_memory().unwrap();
        let note = new_note("moderate me", 0);
        db.insert_note(&note).unwrap();

        assert_eq!(db.update_note_status(&note.id, NoteStatus::Approved).unwrap(), 1);
        assert_eq!(db.update_note_status(&note.id, NoteStatus::Approved).unwrap(), 0);
        // terminal -> other terminal is allowed by the store
        assert_eq!(db.update_note_status(&note.id, NoteStatus::Rejected).unwrap(), 1);
        assert_eq!(db.update_note_status("no-such-id", NoteStatus::Approved).unwrap(), 0);

        let row = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(row.status, NoteStatus::Rejected);
    }

    #[test]
    fn test_unknown_status_on_disk() {
        let db = Database::open_in_memory().unwrap();
        let note = new_note("tampered", 0);
        db.insert_note(&note).unwrap();
        db.with_conn(|conn| {
            // bypass the CHECK so the read path sees a bad value
            conn.execute_batch("PRAGMA ignore_check_constraints = ON;")?;
            conn.execute("UPDATE notes SET status = 'spam' WHERE id = ?1", [&note.id])?;
            Ok(())
        })
        .unwrap();

        let err = db.get_note(&note.id).unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)), "got {err:?}");
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.db");
        let note = new_note("still here", 0);

        {
            let db = Database::open(&path).unwrap();
            db.insert_note(&note).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.get_note(&note.id).unwrap().is_some());
    }
}
