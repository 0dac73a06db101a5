use async_trait::async_trait;
use minimovies_model::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    database::ports::{SessionAuthenticator, sessions::hash_session_token},
    error::Result,
};

/// Reads sessions issued by the auth provider. Never writes.
#[derive(Clone, Debug)]
pub struct PostgresSessionAuthenticator {
    pool: PgPool,
}

impl PostgresSessionAuthenticator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionAuthenticator for PostgresSessionAuthenticator {
    async fn resolve(&self, token: &str) -> Result<Option<UserId>> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM auth_sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(hash_session_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(UserId))
    }
}
