//! Argon2id password hashing and verification
//!
//! Hashes are PHC strings, so algorithm, parameters and salt travel with the
//! hash and verification works across cost changes. Hashing is CPU-bound and
//! runs on the blocking thread pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{distributions::Alphanumeric, Rng};

use crate::config::HashCost;

/// Errors from hashing or verification
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hash parameters: {0}")]
    Params(argon2::Error),
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id hasher with fixed cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a random password, verified against when a user does not exist
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of Argon2's accepted range
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, 1, None)
            .map_err(PasswordError::Params)?;

        let throwaway: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = hash_with(&params, &throwaway)?;

        Ok(Self { params, dummy_hash })
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let params = self.params.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_with(&params, &password)).await?
    }

    /// Check a password against a stored PHC hash
    ///
    /// A malformed stored hash verifies as `false`.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        Ok(tokio::task::spawn_blocking(move || verify_with(&password, &hash)).await?)
    }

    /// Spend the same work as a real verification, always failing
    ///
    /// Used when the username does not exist so both login failures cost the same.
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, PasswordError> {
        self.verify(password, &self.dummy_hash).await?;
        Ok(false)
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

fn verify_with(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };

    // parameters come from the PHC string, not from this instance
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
