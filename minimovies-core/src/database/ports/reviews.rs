use async_trait::async_trait;
use minimovies_model::{MovieId, NewReview, Review};

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Every review of a movie, newest `created_at` first. Unpaginated.
    async fn list_for_movie(&self, movie_id: MovieId) -> Result<Vec<Review>>;

    async fn insert(&self, review: NewReview) -> Result<Review>;
}
