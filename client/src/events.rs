//! Event stream delivered to the embedder.

use std::sync::Arc;
use std::time::Duration;

use push_register::Credentials;

use crate::error::Error;

/// A decrypted push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Server-assigned id; persist it to suppress redelivery across
    /// reconnects, and clear the persisted set on [`Event::Connected`]
    pub persistent_id: String,
    /// Sender address
    pub from: String,
    /// Destination address
    pub to: String,
    /// Time-to-live the sender requested, in seconds
    pub ttl: i32,
    /// Wall-clock send time reported by the server
    pub sent: i64,
    /// Decrypted payload
    pub data: Vec<u8>,
}

/// Events emitted on the client's event bus.
///
/// The bus is bounded (50 events by default) and producers block while it
/// is full, so embedders must keep draining it. Failure payloads are
/// shared `Arc`s because a single error can surface both as
/// [`Event::Unauthorized`] and in the [`Event::Retry`] that follows.
#[derive(Debug)]
pub enum Event {
    /// MCS login was accepted; the replay set has been flushed, so
    /// persisted ids may be cleared
    Connected {
        /// Server wall clock at login
        server_timestamp: i64,
    },
    /// The session was torn down
    Disconnected {
        /// Failure that caused the teardown, when one is known
        reason: Option<String>,
    },
    /// A failed attempt will be retried after the jittered delay
    Retry {
        /// What failed
        error: Arc<Error>,
        /// How long the client sleeps before the next attempt
        retry_after: Duration,
    },
    /// Fresh credentials were minted; persist them for the next start
    UpdateCredentials {
        /// The new credential set
        credentials: Credentials,
    },
    /// A push message arrived and decrypted cleanly
    Message(Message),
    /// The heartbeat deadman forced a disconnect
    HeartbeatError {
        /// The timeout that fired
        error: Arc<Error>,
    },
    /// Stored credentials were rejected; they have been wiped and a full
    /// re-registration follows
    Unauthorized {
        /// The rejection
        error: Arc<Error>,
    },
}
