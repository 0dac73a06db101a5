use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use minimovies_model::{MovieId, ProgressSeconds, WatchHistoryEntry};
use serde::Deserialize;

use crate::infra::{
    app_state::AppState, errors::AppResult, middleware::Viewer,
    responses::ApiResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct AddToHistoryRequest {
    #[serde(default)]
    pub progress_seconds: u32,
}

/// Record watch progress for the signed-in viewer.
///
/// Fire-and-forget: the write runs in the background and this always
/// answers `202 Accepted`, including for anonymous callers (a no-op) and
/// when the write later fails (logged server-side).
pub async fn add_to_history_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<AddToHistoryRequest>,
) -> StatusCode {
    state.services.watch_history.spawn_add_to_history(
        viewer.user_id(),
        movie_id,
        ProgressSeconds::new(request.progress_seconds),
    );
    StatusCode::ACCEPTED
}

/// The viewer's watch history, newest first. Empty for anonymous callers.
pub async fn list_history_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> AppResult<Json<ApiResponse<Vec<WatchHistoryEntry>>>> {
    let entries = state.services.watch_history.list(viewer.user_id()).await?;
    Ok(Json(ApiResponse::success(entries)))
}
