use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use minimovies_core::{
    player::{EmbedOptions, InboundMessage, embed_url},
    watch::TrackerState,
};
use minimovies_model::{MovieDetails, MovieId, ProgressSeconds};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::reviews::MovieReviewsResponse;
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
    middleware::Viewer,
    responses::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub movie_id: MovieId,
}

#[derive(Debug, Deserialize)]
pub struct ChangeMovieRequest {
    pub movie_id: MovieId,
}

#[derive(Debug, Deserialize)]
pub struct ProgressReportRequest {
    /// Player position in seconds; floored before storing.
    pub current_time: f64,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub movie_id: MovieId,
    pub title: String,
    /// `None` when the movie's video URL is not a recognised player URL.
    pub embed_url: Option<String>,
    pub state: TrackerState,
}

#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub state: TrackerState,
    /// True only for the message that started watching.
    pub started: bool,
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::not_found(format!("viewing session {session_id} not found"))
}

async fn require_movie(
    state: &AppState,
    movie_id: MovieId,
) -> AppResult<MovieDetails> {
    state
        .unit_of_work()
        .movies
        .get_details(movie_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("movie {movie_id} not found")))
}

fn session_response(
    state: &AppState,
    session_id: Uuid,
    movie: MovieDetails,
    tracker_state: TrackerState,
) -> SessionResponse {
    let options = EmbedOptions {
        origin: state.config().public_origin.clone(),
    };
    SessionResponse {
        session_id,
        movie_id: movie.id,
        embed_url: embed_url(&movie.video_url, &options).map(String::from),
        title: movie.title,
        state: tracker_state,
    }
}

/// Mount a movie page.
///
/// # Response
///
/// - `201 Created` with the session id and the player embed URL
/// - `404 Not Found` for an unknown movie
pub async fn open_session_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(request): Json<OpenSessionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SessionResponse>>)> {
    let movie = require_movie(&state, request.movie_id).await?;
    let session_id = state
        .viewing_sessions
        .open(viewer.user_id(), request.movie_id);

    let response =
        session_response(&state, session_id, movie, TrackerState::Idle);
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

/// Relay a message the page received from the player frame.
///
/// The body is `{ "origin": ..., "data": ... }` exactly as the page saw it.
/// Anything that is not a trusted "playing" event is ignored; the answer is
/// `202 Accepted` with the tracker state either way.
pub async fn relay_message_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<ApiResponse<TrackerResponse>>)> {
    let viewer = viewer.user_id();
    let context = state
        .viewing_sessions
        .context(session_id, viewer)
        .ok_or_else(|| session_not_found(session_id))?;

    let message = match serde_json::from_value::<InboundMessage>(body) {
        Ok(message) => message,
        Err(err) => {
            debug!(%session_id, error = %err, "ignoring malformed relay body");
            let response = TrackerResponse {
                state: context.state,
                started: false,
            };
            return Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))));
        }
    };

    let (tracker_state, started) = state
        .viewing_sessions
        .relay(session_id, viewer, &message)
        .ok_or_else(|| session_not_found(session_id))?;

    if let Some(start) = started {
        state.services.watch_history.spawn_add_to_history(
            Some(start.user_id),
            start.movie_id,
            ProgressSeconds::ZERO,
        );
    }

    let response = TrackerResponse {
        state: tracker_state,
        started: started.is_some(),
    };
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))))
}

/// Navigate the mounted page to another movie.
///
/// Rearms the tracker and cancels review loads for the previous movie.
pub async fn change_movie_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChangeMovieRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let movie = require_movie(&state, request.movie_id).await?;
    let tracker_state = state
        .viewing_sessions
        .change_movie(session_id, viewer.user_id(), request.movie_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let response = session_response(&state, session_id, movie, tracker_state);
    Ok(Json(ApiResponse::success(response)))
}

/// Report the player position for the mounted movie.
///
/// # Response
///
/// - `202 Accepted`; the write itself is best-effort
/// - `400 Bad Request` for a negative position
pub async fn report_progress_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ProgressReportRequest>,
) -> AppResult<StatusCode> {
    let context = state
        .viewing_sessions
        .context(session_id, viewer.user_id())
        .ok_or_else(|| session_not_found(session_id))?;

    state.services.watch_history.report_progress(
        context.viewer,
        context.movie_id,
        request.current_time,
    )?;
    Ok(StatusCode::ACCEPTED)
}

/// Load reviews for the session's current movie.
///
/// The load is tied to the session: closing it or changing movie while the
/// load is running answers `409 Conflict` and discards the result.
pub async fn session_reviews_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MovieReviewsResponse>>> {
    let context = state
        .viewing_sessions
        .context(session_id, viewer.user_id())
        .ok_or_else(|| session_not_found(session_id))?;

    let summary = state
        .services
        .review_aggregator
        .load_reviews_until_cancelled(context.movie_id, &context.cancel)
        .await?;
    Ok(Json(ApiResponse::success(summary.into())))
}

/// Unmount the page.
pub async fn close_session_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.viewing_sessions.close(session_id, viewer.user_id()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}
