use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// PHC prefix shared by every argon2 variant (`$argon2i$`, `$argon2d$`, `$argon2id$`).
pub const MODERN_HASH_MARKER: &str = "$argon2";

/// Prefix of bcrypt hashes (`$2a$`, `$2b$`, `$2y$`) carried over from older records.
pub const BCRYPT_HASH_MARKER: &str = "$2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CredentialCheck {
    pub matches: bool,
    /// Set only for a matching legacy credential: the caller must rehash and persist.
    pub needs_upgrade: bool,
}

pub fn hash_password(plain: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(password_hash)
}

pub fn verify_password(plain: &str, hashed: &str) -> std::result::Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hashed)?;
    let ok = Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(ok)
}

pub fn is_modern_hash(stored: &str) -> bool {
    stored.starts_with(MODERN_HASH_MARKER)
}

pub fn is_bcrypt_hash(stored: &str) -> bool {
    stored.starts_with(BCRYPT_HASH_MARKER)
}

/// Checks `plain` against a stored credential.
///
/// Values carrying [`MODERN_HASH_MARKER`] are verified with argon2; a marked
/// value that does not parse simply fails to match. bcrypt hashes are verified
/// with bcrypt and anything else is a legacy plaintext credential compared
/// byte for byte. A match on either of those asks for an upgrade. An absent
/// credential never matches.
pub fn verify_credential(plain: &str, stored: Option<&str>) -> CredentialCheck {
    let Some(stored) = stored else {
        return CredentialCheck::default();
    };

    if is_modern_hash(stored) {
        let matches = verify_password(plain, stored).unwrap_or(false);
        return CredentialCheck {
            matches,
            needs_upgrade: false,
        };
    }

    if is_bcrypt_hash(stored) {
        let matches = bcrypt::verify(plain, stored).unwrap_or(false);
        return CredentialCheck {
            matches,
            needs_upgrade: matches,
        };
    }

    let matches: bool = plain.as_bytes().ct_eq(stored.as_bytes()).into();
    CredentialCheck {
        matches,
        needs_upgrade: matches,
    }
}

pub async fn hash_password_blocking(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| Error::Internal(format!("hashing task failed: {}", e)))?
        .map_err(|e| Error::Password(e.to_string()))
}

pub async fn verify_credential_blocking(plain: String, stored: Option<String>) -> Result<CredentialCheck> {
    tokio::task::spawn_blocking(move || verify_credential(&plain, stored.as_deref()))
        .await
        .map_err(|e| Error::Internal(format!("verification task failed: {}", e)))
}
