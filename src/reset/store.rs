use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PendingReset, ResetRecordStore};
use crate::db;
use crate::models::User;

/// Reset columns live on the `users` row; last write wins on concurrent requests.
pub struct PgResetStore {
    pool: PgPool,
}

impl PgResetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetRecordStore for PgResetStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, String> {
        db::users::find_by_email(&self.pool, email)
            .await
            .map_err(|e| e.to_string())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, String> {
        db::users::find_by_reset_token(&self.pool, token_hash, now)
            .await
            .map_err(|e| e.to_string())
    }

    async fn store_reset(&self, user_id: Uuid, reset: &PendingReset) -> Result<(), String> {
        db::users::set_reset(&self.pool, user_id, reset)
            .await
            .map_err(|e| e.to_string())
    }

    async fn consume_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, String> {
        db::users::consume_reset(&self.pool, user_id, token_hash, password_hash, now)
            .await
            .map_err(|e| e.to_string())
    }
}
