//! Web-push payload cryptography.
//!
//! Receiver-side key material (P-256 keypair plus auth secret) and the two
//! HTTP encrypted-content-encoding schemes push services use:
//!
//! - **`aes128gcm`** (RFC 8188 payload encoding with the RFC 8291 web-push
//!   key schedule): salt, record size, and sender public key are embedded
//!   in the payload header.
//! - **`aesgcm`** (the earlier encrypted-content-encoding draft): sender
//!   public key and salt travel out of band in `Crypto-Key` / `Encryption`
//!   headers.
//!
//! All failures are per-message [`CryptoError`] values; nothing here ends a
//! connection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ece;
pub mod error;
pub mod keys;

// Re-export main types
pub use ece::{
    decrypt_aes128gcm, decrypt_aesgcm, encrypt_aes128gcm, encrypt_aesgcm, AesGcmMessage,
};
pub use error::CryptoError;
pub use keys::{WebPushKeys, AUTH_SECRET_LEN, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN};
