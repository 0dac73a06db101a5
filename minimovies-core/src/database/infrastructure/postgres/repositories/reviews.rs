use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minimovies_model::{
    MovieId, NewReview, Rating, Review, ReviewId, UserId,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    database::ports::ReviewRepository,
    error::{CoreError, Result},
};

#[derive(Clone, Debug)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    movie_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = CoreError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Review {
            id: ReviewId(row.id),
            user_id: UserId(row.user_id),
            movie_id: MovieId(row.movie_id),
            rating: Rating::new(i64::from(row.rating))?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn list_for_movie(&self, movie_id: MovieId) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, user_id, movie_id, rating, comment, created_at
            FROM reviews
            WHERE movie_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn insert(&self, review: NewReview) -> Result<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (id, user_id, movie_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, user_id, movie_id, rating, comment, created_at
            "#,
        )
        .bind(ReviewId::new())
        .bind(review.user_id)
        .bind(review.movie_id)
        .bind(i16::from(review.rating.value()))
        .bind(review.comment)
        .fetch_one(&self.pool)
        .await?;

        Review::try_from(row)
    }
}
