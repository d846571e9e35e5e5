//! Catalog query handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;

/// Entry ids contain `/`, so lookups use a query param rather than a path
/// segment.
#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub id: Option<String>,
}

/// GET /api/entries - summaries sorted by title
pub async fn list_entries(State(state): State<AppState>) -> Response {
    Json(state.catalog.snapshot().summaries()).into_response()
}

/// GET /api/entry?id=... - one full entry, items and quiz included
pub async fn entry_detail(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Response {
    let Some(id) = query.id else {
        return error_response(StatusCode::BAD_REQUEST, "Missing id query param");
    };

    match state.catalog.snapshot().get(&id) {
        Some(entry) => Json(&*entry).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Entry not found"),
    }
}
