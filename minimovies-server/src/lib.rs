//! # MiniMovies server
//!
//! HTTP surface for the watch-progress tracker and the review aggregator.
//! A "viewing session" stands in for a mounted movie page: it owns the
//! page's start tracker and cancels the page's in-flight loads when the
//! page goes away.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::infra::{config::Config, middleware::resolve_viewer};

/// Build the full application router.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(state.config());

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(routes::create_api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    resolve_viewer,
                )),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let allow_headers: Vec<HeaderName> =
        vec![header::AUTHORIZATION, header::CONTENT_TYPE];

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ]))
        .allow_headers(AllowHeaders::list(allow_headers))
}
