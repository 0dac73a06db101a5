use async_trait::async_trait;
use minimovies_model::{MovieDetails, MovieId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{database::ports::MovieRepository, error::Result};

#[derive(Clone, Debug)]
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
}

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    async fn get_details(
        &self,
        movie_id: MovieId,
    ) -> Result<Option<MovieDetails>> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, description, video_url, thumbnail_url
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| MovieDetails {
            id: MovieId(row.id),
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
        }))
    }
}
