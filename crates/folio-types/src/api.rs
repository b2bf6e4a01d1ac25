use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::NoteStatus;

// -- Public --

/// Body of `POST /notes`. Both fields are optional on the wire and a
/// non-string value counts as absent, so `{"name": 5}` is an anonymous note
/// and a non-string message fails validation like an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitNoteRequest {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrOther {
    Str(String),
    Other(serde::de::IgnoredAny),
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrOther>::deserialize(deserializer)? {
        Some(StringOrOther::Str(s)) => Some(s),
        Some(StringOrOther::Other(_)) | None => None,
    })
}

/// A note as shown on the public guestbook. Never carries the status or the
/// submitter's address hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicNote {
    pub id: Uuid,
    pub name: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// -- Admin --

#[derive(Debug, Default, Deserialize)]
pub struct AdminNotesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNote {
    pub id: Uuid,
    pub name: Option<String>,
    pub message: String,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
}

// -- Envelopes --

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesResponse<T> {
    pub notes: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Result of approve/reject. `changed` is 0 both when the id is unknown and
/// when the note already had the target status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub ok: bool,
    pub changed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
