//! Argon2 PHC hashing for stored credentials.

use anyhow::anyhow;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

fn argon2() -> Argon2<'static> {
    Argon2::default()
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow!("password hashing failed: {e}")
        })
}

/// `Ok(false)` on a mismatch. Errors when `stored` is not a PHC string,
/// which is how a plaintext credential left in the store shows up.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        warn!(error = %e, "stored credential is not a PHC hash");
        anyhow!("stored credential is not a valid hash: {e}")
    })?;
    match argon2().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "password verification failed");
            Err(anyhow!("password verification failed: {e}"))
        }
    }
}
