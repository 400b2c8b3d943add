use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::ResetError;

/// Random bytes per reset token. Rendered as hex this is 40 characters.
pub const TOKEN_BYTES: usize = 20;

/// Source of single-use reset tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Result<String, ResetError>;
}

/// Draws tokens straight from the operating system CSPRNG.
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self) -> Result<String, ResetError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ResetError::EntropyUnavailable(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

/// SHA-256 digest of a token, the only form that is ever persisted.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
