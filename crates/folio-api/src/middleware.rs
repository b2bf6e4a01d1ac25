use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the admin shared secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Gate admin routes on the shared secret. Each request is checked on its
/// own; there are no sessions.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.authorize(provided) {
        match e {
            ApiError::Misconfigured => warn!("Admin request refused: no admin key configured"),
            _ => warn!("Admin request refused: bad or missing credential"),
        }
        return Err(e);
    }

    Ok(next.run(req).await)
}
