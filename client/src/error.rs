//! Client error types.

use std::time::Duration;

use push_crypto::CryptoError;
use push_register::RegisterError;
use push_wire::WireError;
use thiserror::Error;

/// Top-level client failure classes.
#[derive(Error, Debug)]
pub enum Error {
    /// Registration or identity endpoint failed
    #[error("registration: {0}")]
    Register(#[from] RegisterError),

    /// MCS framing or decoding failed; fatal for the session
    #[error("wire protocol: {0}")]
    Wire(#[from] WireError),

    /// Payload decryption failed; scoped to one message
    #[error("payload decryption: {0}")]
    Crypto(#[from] CryptoError),

    /// Socket-level failure
    #[error("connection i/o: {0}")]
    Io(#[from] std::io::Error),

    /// TCP connect plus TLS handshake did not finish in time
    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),

    /// MCS server address could not be used for TLS
    #[error("invalid server address: {0}")]
    ServerAddress(String),

    /// No heartbeat ack arrived within the deadman window
    #[error("heartbeat timed out")]
    HeartbeatTimeout,

    /// Server sent a Close frame
    #[error("server closed the stream")]
    ServerClose,

    /// Server reported a stream-level error
    #[error("stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Whether this failure must wipe credentials and force re-registration.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Register(RegisterError::Unauthorized))
    }
}
