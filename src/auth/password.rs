use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id v1.3 with the crate's default cost.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// PHC string for `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("stored password hash is not a PHC string")?;
    match hasher().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "password verification failed");
            Err(anyhow::anyhow!("verify password: {e}"))
        }
    }
}
