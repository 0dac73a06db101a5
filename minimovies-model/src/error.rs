use thiserror::Error;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("rating must be between {min} and {max}, got {value}")]
    RatingOutOfRange { value: i64, min: u8, max: u8 },

    #[error("invalid progress: {0}")]
    InvalidProgress(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
