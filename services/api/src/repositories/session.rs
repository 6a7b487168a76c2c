//! Session repository: one row per issued bearer token

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::models::Session;

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an issued token
    pub async fn create(&self, user_id: i64, token_hash: &str, expires_at: u64) -> Result<Session> {
        let expires_at: DateTime<Utc> = Utc
            .timestamp_opt(i64::try_from(expires_at)?, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("Invalid token expiry: {}", expires_at))?;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Whether the token is recorded, unexpired and owned by the user
    pub async fn is_active(&self, user_id: i64, token_hash: &str) -> Result<bool> {
        let active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sessions
                WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW()
            )
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(active)
    }

    /// Revoke a token
    pub async fn revoke(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Purged {} expired sessions", result.rows_affected());
        }

        Ok(result.rows_affected())
    }
}
