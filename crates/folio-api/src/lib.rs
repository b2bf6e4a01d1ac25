pub mod admin;
pub mod client_addr;
pub mod config;
pub mod error;
pub mod middleware;
pub mod moderation;
pub mod notes;
pub mod rate_limit;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::require_admin;
use crate::state::AppState;

/// JSON bodies larger than this are refused.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// All guestbook routes, unprefixed. The server mounts this under `/api`.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/notes", get(admin::list_notes))
        .route("/admin/notes/{id}/approve", post(admin::approve_note))
        .route("/admin/notes/{id}/reject", post(admin::reject_note))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(notes::health))
        .route("/notes", get(notes::list_notes).post(notes::submit_note))
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
