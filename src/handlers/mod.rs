//! HTTP surface: catalog queries, health, the attribution-image proxy, and
//! static media under `/data`.

pub mod entries;
pub mod profile_pic;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub use entries::{entry_detail, list_entries};
pub use profile_pic::profile_pic;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub entries: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON error body with the given status.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET / - plain-text liveness line
pub async fn index() -> &'static str {
    "clipquiz backend is running. See /api/entries."
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        entries: state.catalog.snapshot().len(),
    })
}

/// Assemble the application router over the given state.
///
/// Lives in the library so integration tests can mount the exact router the
/// binary serves.
pub fn router(state: AppState) -> Router {
    let media_dir = ServeDir::new(&state.content_root);
    Router::new()
        .route("/", get(index))
        .route("/api/entries", get(list_entries))
        .route("/api/entry", get(entry_detail))
        .route("/api/health", get(health))
        .route("/api/profile-pic", get(profile_pic))
        .nest_service("/data", media_dir)
        .with_state(state)
}
