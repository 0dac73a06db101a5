use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    handlers::{reviews, viewing_sessions, watch_history},
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .merge(create_viewing_session_routes())
        .merge(create_review_routes())
        .merge(create_watch_history_routes())
}

/// Routes backing a mounted movie page
fn create_viewing_session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/viewing-sessions",
            post(viewing_sessions::open_session_handler),
        )
        .route(
            "/viewing-sessions/{id}",
            delete(viewing_sessions::close_session_handler),
        )
        .route(
            "/viewing-sessions/{id}/messages",
            post(viewing_sessions::relay_message_handler),
        )
        .route(
            "/viewing-sessions/{id}/movie",
            put(viewing_sessions::change_movie_handler),
        )
        .route(
            "/viewing-sessions/{id}/progress",
            post(viewing_sessions::report_progress_handler),
        )
        .route(
            "/viewing-sessions/{id}/reviews",
            get(viewing_sessions::session_reviews_handler),
        )
}

fn create_review_routes() -> Router<AppState> {
    Router::new().route(
        "/movies/{id}/reviews",
        get(reviews::list_movie_reviews_handler)
            .post(reviews::submit_review_handler),
    )
}

fn create_watch_history_routes() -> Router<AppState> {
    Router::new()
        .route("/watch-history", get(watch_history::list_history_handler))
        .route(
            "/watch-history/{movie_id}",
            put(watch_history::add_to_history_handler),
        )
}
