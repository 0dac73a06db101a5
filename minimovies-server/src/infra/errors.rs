use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use minimovies_core::CoreError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request(msg),
            CoreError::Unauthenticated => {
                Self::unauthorized("Authentication required")
            }
            CoreError::NotFound(msg) => Self::not_found(msg),
            CoreError::Cancelled(msg) => Self::conflict(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "database operation failed");
        Self::internal("Database operation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (CoreError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CoreError::NotFound("movie".into()), StatusCode::NOT_FOUND),
            (CoreError::Cancelled("load".into()), StatusCode::CONFLICT),
            (
                CoreError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn database_details_are_not_leaked() {
        let err = AppError::from(CoreError::Database("password=hunter2".into()));
        assert!(!err.message.contains("hunter2"));
    }
}
