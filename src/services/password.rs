//! Password hashing
//!
//! bcrypt is CPU bound, so both operations run on the blocking pool.

use async_trait::async_trait;

use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plain: &str) -> AppResult<String>;
    async fn verify(&self, plain: &str, hash: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, plain: &str) -> AppResult<String> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }

    async fn verify(&self, plain: &str, hash: &str) -> AppResult<bool> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;

        // A malformed stored hash is a mismatch, not a server error
        Ok(verified.unwrap_or(false))
    }
}
