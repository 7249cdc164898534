//! Registration error types.

use thiserror::Error;

/// Errors from the check-in and registration endpoints.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// The stored device identity was rejected; credentials must be wiped
    /// and minted again
    #[error("device identity rejected (unauthorized)")]
    Unauthorized,

    /// Endpoint answered with a non-success status
    #[error("server error: {0}")]
    Status(reqwest::StatusCode),

    /// Transport-level HTTP failure
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    /// Registration endpoint reported an in-band error
    #[error("registration rejected: {0}")]
    Rejected(String),

    /// Protobuf response failed to decode
    #[error("decode check-in response: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Response was missing a required field
    #[error("response missing {0}")]
    MissingField(&'static str),

    /// The call was cancelled before the endpoint answered
    #[error("registration cancelled")]
    Cancelled,
}
