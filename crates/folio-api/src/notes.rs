use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;

use folio_types::api::{NotesResponse, OkResponse, PublicNote, SubmitNoteRequest};

use crate::client_addr::ClientAddr;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /notes — approved notes, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
) -> Result<Json<NotesResponse<PublicNote>>, ApiError> {
    // Run blocking DB query off the async runtime
    let svc = state.clone();
    let notes = tokio::task::spawn_blocking(move || svc.list_approved()).await??;

    Ok(Json(NotesResponse { notes }))
}

/// POST /notes — submit a note for moderation. Rate limited per caller.
pub async fn submit_note(
    State(state): State<AppState>,
    caller: ClientAddr,
    WithRejection(Json(req), _): WithRejection<Json<SubmitNoteRequest>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let svc = state.clone();
    tokio::task::spawn_blocking(move || {
        svc.submit(req.name.as_deref(), req.message.as_deref(), &caller)
    })
    .await??;

    Ok(Json(OkResponse { ok: true }))
}

/// GET /health — liveness check (no auth).
pub async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}
