use minimovies_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                CoreError::NotFound("row not found".to_string())
            }
            other => CoreError::Database(other.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for CoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        CoreError::Database(format!("migration failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
