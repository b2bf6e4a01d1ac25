/// Database row types. These map directly to SQLite rows and stay distinct
/// from the folio-types API models so the store never leaks `ip_hash`.
use folio_types::models::NoteStatus;

/// A note about to be inserted. Status is not a field: new notes are always
/// `pending`.
pub struct NewNote {
    pub id: String,
    pub name: Option<String>,
    pub message: String,
    pub ip_hash: Option<String>,
    /// RFC 3339 UTC, millisecond precision.
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: String,
    pub name: Option<String>,
    pub message: String,
    pub status: NoteStatus,
    pub ip_hash: Option<String>,
    pub created_at: String,
}
