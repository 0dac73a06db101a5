use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use minimovies_core::reviews::ReviewPanel;
use minimovies_model::{MovieId, Review, ReviewSummary};
use serde::{Deserialize, Serialize};

use crate::infra::{
    app_state::AppState, errors::AppResult, middleware::Viewer,
    responses::ApiResponse,
};

/// Reviews of one movie, raw and display-ready.
#[derive(Debug, Serialize)]
pub struct MovieReviewsResponse {
    #[serde(flatten)]
    pub summary: ReviewSummary,
    pub display: ReviewPanel,
}

impl From<ReviewSummary> for MovieReviewsResponse {
    fn from(summary: ReviewSummary) -> Self {
        let display = ReviewPanel::from(&summary);
        Self { summary, display }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// Raw form value; `0` means "not selected" and is rejected.
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// List a movie's reviews, newest first, with author names and the
/// average rating.
///
/// # Response
///
/// - `200 OK` with the summary and its display model
/// - `500` if the reviews could not be loaded; profile lookup failures only
///   degrade author names
pub async fn list_movie_reviews_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<ApiResponse<MovieReviewsResponse>>> {
    let summary = state
        .services
        .review_aggregator
        .load_reviews(movie_id)
        .await?;
    Ok(Json(ApiResponse::success(summary.into())))
}

/// Submit a review for a movie.
///
/// # Request
///
/// ```json
/// { "rating": 4, "comment": "Lovely short." }
/// ```
///
/// # Response
///
/// - `201 Created` with the stored review
/// - `400 Bad Request` if the rating is outside 1..=5
/// - `401 Unauthorized` without a signed-in viewer
/// - `404 Not Found` for an unknown movie
pub async fn submit_review_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let review = state
        .services
        .review_submitter
        .submit(viewer.user_id(), movie_id, request.rating, request.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}
