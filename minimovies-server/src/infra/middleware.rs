use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use minimovies_model::UserId;
use tracing::{debug, warn};

use crate::infra::app_state::AppState;

/// The signed-in user for a request, if any.
///
/// Always present in request extensions once [`resolve_viewer`] has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer(pub Option<UserId>);

impl Viewer {
    pub fn user_id(&self) -> Option<UserId> {
        self.0
    }
}

/// Resolve an optional bearer token to a [`Viewer`].
///
/// Missing, malformed, unknown and expired tokens all yield an anonymous
/// viewer; nothing here rejects the request.
pub async fn resolve_viewer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let viewer = match extract_bearer_token(&request) {
        Some(token) => {
            match state.unit_of_work().sessions.resolve(&token).await {
                Ok(Some(user_id)) => Viewer(Some(user_id)),
                Ok(None) => {
                    debug!("bearer token did not resolve to a session");
                    Viewer(None)
                }
                Err(error) => {
                    warn!(%error, "session lookup failed, treating request as anonymous");
                    Viewer(None)
                }
            }
        }
        None => Viewer(None),
    };

    request.extensions_mut().insert(viewer);
    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
