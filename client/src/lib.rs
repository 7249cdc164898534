//! FCM web-push receiver client.
//!
//! Impersonates a Chrome-browser web-push endpoint so a headless program
//! can receive Firebase Cloud Messaging pushes addressed to a web app:
//! registers with Google's device-identity and Firebase installation
//! services, keeps a long-lived TLS connection to the MCS server open with
//! heartbeats, reconnects with jittered exponential backoff, and surfaces
//! decrypted payloads as an event stream.
//!
//! ## Example
//!
//! ```rust,no_run
//! use push_client::{ClientConfig, Event, PushClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let config = ClientConfig {
//!     api_key: "AIza…".to_string(),
//!     project_id: "my-project".to_string(),
//!     app_id: "1:1234:web:abcd".to_string(),
//!     vapid_key: None,
//! };
//! let (client, mut events) = PushClient::new(config);
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(client.run(cancel.clone()));
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         Event::UpdateCredentials { credentials } => { /* persist them */ }
//!         Event::Connected { .. } => { /* clear persisted ids */ }
//!         Event::Message(message) => {
//!             println!("push: {}", String::from_utf8_lossy(&message.data));
//!             /* persist message.persistent_id */
//!         }
//!         _ => {}
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod heartbeat;
mod payload;
mod session;
mod transport;

// Re-export main types
pub use backoff::Backoff;
pub use client::PushClient;
pub use config::{ClientConfig, ClientOptions, MTALK_SERVER};
pub use error::Error;
pub use events::{Event, Message};
pub use heartbeat::HeartbeatConfig;

// Re-export the registration surface embedders persist and override
pub use push_register::{Credentials, Endpoints};
