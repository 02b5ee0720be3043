use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::CryptoError;

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const ITERATIONS: u32 = 100_000;

/// A derived password hash together with the salt that produced it,
/// both base64 encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Derive a storable hash from `password`.
///
/// With `salt = None` a fresh 16-byte salt is drawn from the thread CSPRNG.
/// Passing a previously stored salt reproduces the stored hash exactly.
pub fn derive_password_hash(
    password: &str,
    salt: Option<&str>,
) -> Result<PasswordHash, CryptoError> {
    let salt_bytes = match salt {
        Some(encoded) => BASE64.decode(encoded)?,
        None => generate_salt().to_vec(),
    };

    let key = derive_key(password.as_bytes(), &salt_bytes, ITERATIONS);

    Ok(PasswordHash {
        hash: BASE64.encode(key),
        salt: BASE64.encode(&salt_bytes),
    })
}

/// Check `password` against a stored hash/salt pair.
pub fn verify_password(
    password: &str,
    stored_hash: &str,
    stored_salt: &str,
) -> Result<bool, CryptoError> {
    let salt = BASE64.decode(stored_salt)?;
    let expected = BASE64.decode(stored_hash)?;
    let actual = derive_key(password.as_bytes(), &salt, ITERATIONS);
    // ct_eq also returns false on a length mismatch
    Ok(bool::from(actual.as_slice().ct_eq(expected.as_slice())))
}

fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

fn derive_key(password: &[u8], salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key);
    key
}
