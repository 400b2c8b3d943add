use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;
use crate::reset::PendingReset;

pub async fn create(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, password_hash)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_reset_token(
    pool: &PgPool,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE reset_token_hash = $1 AND reset_expires_at > $2",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn set_reset(
    pool: &PgPool,
    id: Uuid,
    reset: &PendingReset,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET reset_token_hash = $2, reset_expires_at = $3 WHERE id = $1")
        .bind(id)
        .bind(&reset.token_hash)
        .bind(reset.expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Swap in the new password hash and spend the token in one statement.
/// Returns false if the token no longer matches or has expired.
pub async fn consume_reset(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET password_hash = $3, reset_token_hash = NULL, reset_expires_at = NULL
         WHERE id = $1 AND reset_token_hash = $2 AND reset_expires_at > $4",
    )
    .bind(id)
    .bind(token_hash)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
