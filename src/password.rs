//! Password hashing with Argon2
//!
//! Both operations run on the blocking thread pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::error::ModelError;

pub async fn hash(password: &str) -> Result<String, ModelError> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash_sync(&password))
        .await
        .map_err(|e| ModelError::PasswordHash(e.to_string()))?
}

/// Returns `Ok(false)` for a well-formed hash that does not match.
pub async fn verify(password: &str, hashed: &str) -> Result<bool, ModelError> {
    let (password, hashed) = (password.to_owned(), hashed.to_owned());
    task::spawn_blocking(move || verify_sync(&password, &hashed))
        .await
        .map_err(|e| ModelError::PasswordHash(e.to_string()))?
}

fn hash_sync(password: &str) -> Result<String, ModelError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ModelError::PasswordHash(e.to_string()))
}

fn verify_sync(password: &str, hashed: &str) -> Result<bool, ModelError> {
    let parsed =
        PasswordHash::new(hashed).map_err(|e| ModelError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
