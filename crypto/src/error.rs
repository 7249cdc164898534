//! Crypto error types.

use thiserror::Error;

/// Errors from web-push key handling and HTTP-ECE processing.
///
/// Always scoped to a single message; the session that carried the payload
/// stays up.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Receiver private key was not a valid P-256 scalar
    #[error("invalid receiver private key")]
    InvalidPrivateKey,

    /// Sender public key was not a valid SEC1 point
    #[error("invalid sender public key")]
    InvalidPublicKey,

    /// Auth secret had the wrong length
    #[error("invalid auth secret length: {0}")]
    InvalidAuthSecret(usize),

    /// Salt had the wrong length
    #[error("invalid salt length: {0}")]
    InvalidSalt(usize),

    /// Payload ended before the named section was complete
    #[error("truncated payload: {0}")]
    Truncated(&'static str),

    /// Record size outside the legal range
    #[error("invalid record size: {0}")]
    RecordSize(u32),

    /// Record padding did not match the scheme
    #[error("invalid record padding")]
    Padding,

    /// AEAD authentication failed
    #[error("aead open failed")]
    Aead,

    /// Key derivation failed
    #[error("key derivation failed")]
    Hkdf,

    /// A required encryption header was absent from the message
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    /// An encryption header was present but unparseable
    #[error("malformed {0} header")]
    MalformedHeader(&'static str),
}
