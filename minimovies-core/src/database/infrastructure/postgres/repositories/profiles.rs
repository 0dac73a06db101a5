use std::collections::HashMap;

use async_trait::async_trait;
use minimovies_model::UserId;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{database::ports::ProfileRepository, error::Result};

#[derive(Clone, Debug)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProfileNameRow {
    id: Uuid,
    full_name: Option<String>,
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = user_ids.iter().map(UserId::to_uuid).collect();
        let rows = sqlx::query_as::<_, ProfileNameRow>(
            r#"
            SELECT id, full_name
            FROM profiles
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let name = row.full_name?.trim().to_string();
                (!name.is_empty()).then_some((UserId(row.id), name))
            })
            .collect())
    }
}
