use async_trait::async_trait;

use super::password;
use crate::reset::{CredentialError, CredentialStore};

/// Argon2id hashes for `users.password_hash`.
pub struct Argon2Credentials;

#[async_trait]
impl CredentialStore for Argon2Credentials {
    async fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        password::check_strength(plaintext).map_err(CredentialError::WeakPassword)?;
        password::hash(plaintext).map_err(CredentialError::Internal)
    }
}
