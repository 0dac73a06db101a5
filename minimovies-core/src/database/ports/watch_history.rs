use async_trait::async_trait;
use minimovies_model::{MovieId, UserId, WatchHistoryEntry, WatchProgress};

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchHistoryRepository: Send + Sync {
    /// Insert or replace the record keyed by `(user_id, movie_id)`.
    async fn upsert_progress(&self, progress: &WatchProgress) -> Result<()>;

    /// All entries for a user, most recently watched first.
    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchHistoryEntry>>;

    async fn get_progress(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<Option<WatchProgress>>;
}
