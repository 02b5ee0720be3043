//! gemchat credential & token service
//!
//! Password storage uses PBKDF2-HMAC-SHA256 with a per-user random salt.
//! Session tokens are three dot-separated segments (header, payload,
//! signature) signed with HMAC-SHA256 under a shared server secret.
//! Both halves are pure functions with no I/O.

pub mod password;
pub mod token;

pub use password::{PasswordHash, derive_password_hash, verify_password};
pub use token::{sign_token, verify_token};

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("payload is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid signing key")]
    InvalidKey,
}
