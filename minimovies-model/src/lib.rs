//! Core data model definitions shared across MiniMovies crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod movie;
pub mod review;
pub mod watch;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{MovieId, ReviewId, UserId};
pub use movie::{MovieDetails, MovieSummary};
pub use review::{NewReview, Rating, Review, ReviewSummary, ReviewWithAuthor};
pub use watch::{ProgressSeconds, WatchHistoryEntry, WatchProgress};
