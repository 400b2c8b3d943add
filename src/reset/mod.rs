//! Password reset lifecycle.
//!
//! A request for a known email stores the hash of a fresh token with an expiry
//! on the account and mails a link carrying the plaintext token. Presenting
//! the token before it expires lets the holder set a new password; the new
//! hash and the cleared reset columns land in a single conditional write, so a
//! token is spent exactly once or not at all. Expired tokens are never swept; they simply
//! stop matching and are overwritten by the next request.

pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{User, normalize_email};
use token::{OsTokenGenerator, TokenGenerator, hash_token};

pub const PASSWORD_RESET_TEMPLATE: &str = "password-reset";

/// Hash and expiry of the single outstanding token on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReset {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingReset {
    /// Expiry is exclusive: a token is dead at exactly `expires_at`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetNotice {
    pub recipient: String,
    pub subject: String,
    pub template_id: &'static str,
    pub reset_link: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResetError {
    InvalidOrExpiredToken,
    PasswordMismatch,
    EntropyUnavailable(String),
    WeakPassword(String),
    Credential(String),
    Notification(String),
    Store(String),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::InvalidOrExpiredToken => {
                write!(f, "Password reset is invalid or has expired")
            }
            ResetError::PasswordMismatch => write!(f, "Passwords do not match"),
            ResetError::EntropyUnavailable(msg) => write!(f, "Secure random source failed: {msg}"),
            ResetError::WeakPassword(msg) => write!(f, "{msg}"),
            ResetError::Credential(msg) => write!(f, "Failed to set password: {msg}"),
            ResetError::Notification(msg) => write!(f, "Failed to deliver reset notice: {msg}"),
            ResetError::Store(msg) => write!(f, "Reset store error: {msg}"),
        }
    }
}

impl std::error::Error for ResetError {}

#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    WeakPassword(String),
    Internal(String),
}

impl From<CredentialError> for ResetError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::WeakPassword(msg) => ResetError::WeakPassword(msg),
            CredentialError::Internal(msg) => ResetError::Credential(msg),
        }
    }
}

#[async_trait]
pub trait ResetRecordStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, String>;

    /// Account holding `token_hash` whose expiry is strictly after `now`.
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, String>;

    /// Overwrite the pending reset of an account.
    async fn store_reset(&self, user_id: Uuid, reset: &PendingReset) -> Result<(), String>;

    /// Install `password_hash` and clear the reset columns in one write, but
    /// only while `token_hash` is still the account's live token at `now`.
    /// Returns false when the token was already spent, replaced or expired.
    async fn consume_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, String>;
}

/// Applies the password policy and derives the stored hash.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError>;
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notice: &ResetNotice) -> Result<(), String>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct ResetWorkflow {
    store: Arc<dyn ResetRecordStore>,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    base_url: String,
    ttl: Duration,
}

impl ResetWorkflow {
    pub fn new(
        store: Arc<dyn ResetRecordStore>,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        base_url: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            credentials,
            notifier,
            tokens: Arc::new(OsTokenGenerator),
            clock: Arc::new(SystemClock),
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/account/reset/{token}", self.base_url)
    }

    /// Issue a fresh token for `email` and send the link.
    ///
    /// Unknown emails succeed without touching anything so callers cannot tell
    /// registered addresses apart. A new token replaces any earlier one. If the
    /// notice cannot be delivered the token stays persisted and
    /// [`ResetError::Notification`] is returned.
    pub async fn request_reset(&self, email: &str) -> Result<(), ResetError> {
        let email = normalize_email(email);

        let Some(user) = self
            .store
            .find_by_email(&email)
            .await
            .map_err(ResetError::Store)?
        else {
            tracing::debug!("Password reset requested for unregistered email");
            return Ok(());
        };

        let token = self.tokens.generate()?;
        let pending = PendingReset {
            token_hash: hash_token(&token),
            expires_at: self.clock.now() + self.ttl,
        };

        self.store
            .store_reset(user.id, &pending)
            .await
            .map_err(ResetError::Store)?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %pending.expires_at,
            "Password reset token issued"
        );

        let notice = ResetNotice {
            recipient: user.email,
            subject: "Password Reset".to_string(),
            template_id: PASSWORD_RESET_TEMPLATE,
            reset_link: self.reset_link(&token),
        };

        self.notifier
            .send(&notice)
            .await
            .map_err(ResetError::Notification)
    }

    /// Account owning a live `token`.
    pub async fn validate_token(&self, token: &str) -> Result<User, ResetError> {
        if token.is_empty() {
            return Err(ResetError::InvalidOrExpiredToken);
        }

        let now = self.clock.now();
        self.store
            .find_by_reset_token(&hash_token(token), now)
            .await
            .map_err(ResetError::Store)?
            .ok_or(ResetError::InvalidOrExpiredToken)
    }

    /// Set a new password for the holder of `token` and consume the token.
    ///
    /// Nothing is written unless the passwords match, the password passes the
    /// policy and the token is still live at the moment of the write.
    pub async fn complete_reset(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User, ResetError> {
        if password != password_confirm {
            return Err(ResetError::PasswordMismatch);
        }

        let mut user = self.validate_token(token).await?;
        let password_hash = self.credentials.hash_password(password).await?;

        let consumed = self
            .store
            .consume_reset(user.id, &hash_token(token), &password_hash, self.clock.now())
            .await
            .map_err(ResetError::Store)?;
        if !consumed {
            return Err(ResetError::InvalidOrExpiredToken);
        }

        user.password_hash = password_hash;
        user.reset_token_hash = None;
        user.reset_expires_at = None;

        tracing::info!(user_id = %user.id, "Password reset completed");

        Ok(user)
    }
}
