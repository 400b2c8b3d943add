use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reset::PendingReset;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The outstanding reset, if both reset columns are populated.
    pub fn pending_reset(&self) -> Option<PendingReset> {
        match (&self.reset_token_hash, self.reset_expires_at) {
            (Some(token_hash), Some(expires_at)) => Some(PendingReset {
                token_hash: token_hash.clone(),
                expires_at,
            }),
            _ => None,
        }
    }
}

/// Emails are matched case-insensitively; everything is stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
