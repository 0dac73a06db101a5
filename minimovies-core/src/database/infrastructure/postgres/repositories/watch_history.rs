use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minimovies_model::{
    MovieId, MovieSummary, ProgressSeconds, UserId, WatchHistoryEntry,
    WatchProgress,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{database::ports::WatchHistoryRepository, error::Result};

#[derive(Clone, Debug)]
pub struct PostgresWatchHistoryRepository {
    pool: PgPool,
}

impl PostgresWatchHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct HistoryRow {
    movie_id: Uuid,
    watched_at: DateTime<Utc>,
    progress_seconds: i64,
    title: Option<String>,
    thumbnail_url: Option<String>,
}

#[derive(FromRow)]
struct ProgressRow {
    user_id: Uuid,
    movie_id: Uuid,
    watched_at: DateTime<Utc>,
    progress_seconds: i64,
}

#[async_trait]
impl WatchHistoryRepository for PostgresWatchHistoryRepository {
    async fn upsert_progress(&self, progress: &WatchProgress) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, movie_id, watched_at, progress_seconds)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, movie_id) DO UPDATE SET
                watched_at = EXCLUDED.watched_at,
                progress_seconds = EXCLUDED.progress_seconds
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.movie_id)
        .bind(progress.watched_at)
        .bind(i64::from(progress.progress_seconds.as_secs()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT w.movie_id, w.watched_at, w.progress_seconds,
                   m.title, m.thumbnail_url
            FROM watch_history w
            LEFT JOIN movies m ON m.id = w.movie_id
            WHERE w.user_id = $1
            ORDER BY w.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let movie = match (row.title, row.thumbnail_url) {
                    (Some(title), thumbnail_url) => Some(MovieSummary {
                        title,
                        thumbnail_url: thumbnail_url.unwrap_or_default(),
                    }),
                    (None, _) => None,
                };
                Ok(WatchHistoryEntry {
                    movie_id: MovieId(row.movie_id),
                    watched_at: row.watched_at,
                    progress_seconds: ProgressSeconds::from_db(
                        row.progress_seconds,
                    )?,
                    movie,
                })
            })
            .collect()
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<Option<WatchProgress>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT user_id, movie_id, watched_at, progress_seconds
            FROM watch_history
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(WatchProgress {
                user_id: UserId(row.user_id),
                movie_id: MovieId(row.movie_id),
                watched_at: row.watched_at,
                progress_seconds: ProgressSeconds::from_db(
                    row.progress_seconds,
                )?,
            })
        })
        .transpose()
    }
}
