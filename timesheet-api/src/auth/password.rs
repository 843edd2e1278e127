//! Argon2id password hashing.
//!
//! Hashing and verification are CPU-bound, so the async entry points run
//! them on the blocking pool.

use std::sync::LazyLock;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};

use crate::domain::{TimesheetError, TimesheetResult};

/// Verified against when the login email matches no usable account, so a
/// miss costs as much as a wrong password.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_blocking("decoy password for unknown accounts").ok());

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash with a random salt, returning a PHC string.
    pub async fn hash(&self, password: &str) -> TimesheetResult<String> {
        if password.is_empty() {
            return Err(TimesheetError::validation("password must not be empty"));
        }

        let password = password.to_owned();
        run_blocking(move || hash_blocking(&password)).await
    }

    /// `Ok(false)` on a wrong password, `Err` on a malformed hash.
    pub async fn verify(&self, password: &str, hash: &str) -> TimesheetResult<bool> {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        run_blocking(move || verify_blocking(&password, &hash)).await
    }

    /// Does the work of a verification without an account behind it.
    /// Always `false`.
    pub async fn verify_missing(&self, password: &str) -> bool {
        let password = password.to_owned();
        let _ = run_blocking(move || match DECOY_HASH.as_deref() {
            Some(decoy) => verify_blocking(&password, decoy),
            None => Ok(false),
        })
        .await;
        false
    }
}

async fn run_blocking<T, F>(work: F) -> TimesheetResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> TimesheetResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| TimesheetError::internal(format!("password task failed: {err}")))?
}

fn hash_blocking(password: &str) -> TimesheetResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TimesheetError::internal(format!("password hashing failed: {e}")))
}

fn verify_blocking(password: &str, hash: &str) -> TimesheetResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| TimesheetError::internal(format!("invalid password hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(TimesheetError::internal(format!(
            "password verification failed: {e}"
        ))),
    }
}
