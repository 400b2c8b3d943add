//! In-process collaborators for exercising the workflow without Postgres.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::token::TokenGenerator;
use super::{
    Clock, CredentialError, CredentialStore, NotificationDispatcher, PendingReset,
    ResetError, ResetNotice, ResetRecordStore,
};
use crate::auth::password;
use crate::models::User;

pub struct MemoryResetStore {
    users: DashMap<Uuid, User>,
    fail_writes: AtomicBool,
}

impl MemoryResetStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every write report a lost connection until switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("connection reset".to_string());
        }
        Ok(())
    }

    pub fn insert(&self, email: &str, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                name: name.to_string(),
                password_hash: "hashed:original".to_string(),
                reset_token_hash: None,
                reset_expires_at: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> User {
        self.users.get(&id).expect("unknown user").clone()
    }
}

#[async_trait]
impl ResetRecordStore for MemoryResetStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, String> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, String> {
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.pending_reset()
                    .is_some_and(|p| p.token_hash == token_hash && p.is_live_at(now))
            })
            .map(|u| u.value().clone()))
    }

    async fn store_reset(&self, user_id: Uuid, reset: &PendingReset) -> Result<(), String> {
        self.check_writable()?;
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| format!("no user {user_id}"))?;
        user.reset_token_hash = Some(reset.token_hash.clone());
        user.reset_expires_at = Some(reset.expires_at);
        Ok(())
    }

    async fn consume_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, String> {
        self.check_writable()?;
        let Some(mut user) = self.users.get_mut(&user_id) else {
            return Ok(false);
        };
        let live = user
            .pending_reset()
            .is_some_and(|p| p.token_hash == token_hash && p.is_live_at(now));
        if !live {
            return Ok(false);
        }
        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_expires_at = None;
        Ok(true)
    }
}

/// Marks passwords instead of hashing them so tests can read back what was set.
pub struct MemoryCredentials;

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        password::check_strength(plaintext).map_err(CredentialError::WeakPassword)?;
        Ok(format!("hashed:{plaintext}"))
    }
}

pub struct RecordingNotifier {
    sent: Mutex<Vec<ResetNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn last(&self) -> Option<ResetNotice> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send(&self, notice: &ResetNotice) -> Result<(), String> {
        if self.fail {
            return Err("mail relay unreachable".to_string());
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct FailingTokens;

impl TokenGenerator for FailingTokens {
    fn generate(&self) -> Result<String, ResetError> {
        Err(ResetError::EntropyUnavailable("getrandom unavailable".to_string()))
    }
}
