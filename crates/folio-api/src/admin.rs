use axum::{
    Json,
    extract::{Path, Query, State},
};

use folio_types::api::{AdminNote, AdminNotesQuery, ModerationResponse, NotesResponse};
use folio_types::models::NoteStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /admin/notes?status= — an absent or empty status means the pending queue.
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<AdminNotesQuery>,
) -> Result<Json<NotesResponse<AdminNote>>, ApiError> {
    let status: NoteStatus = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(NoteStatus::Pending.as_str())
        .parse()
        .map_err(|_| ApiError::Validation("Invalid status".into()))?;

    let svc = state.clone();
    let notes = tokio::task::spawn_blocking(move || svc.list_by_status(status)).await??;

    Ok(Json(NotesResponse { notes }))
}

/// POST /admin/notes/{id}/approve
pub async fn approve_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse>, ApiError> {
    let svc = state.clone();
    let changed = tokio::task::spawn_blocking(move || svc.approve(&id)).await??;

    Ok(Json(ModerationResponse { ok: true, changed }))
}

/// POST /admin/notes/{id}/reject
pub async fn reject_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse>, ApiError> {
    let svc = state.clone();
    let changed = tokio::task::spawn_blocking(move || svc.reject(&id)).await??;

    Ok(Json(ModerationResponse { ok: true, changed }))
}
