//! Device identity and Firebase registration clients for FCM web push.
//!
//! Minting credentials for a web-push endpoint is a four-step exchange:
//!
//! 1. **check-in** — protobuf POST presenting a Chrome-browser fingerprint;
//!    returns an android id + security token pair
//! 2. **register3** — form POST binding the android id to the app; returns
//!    a GCM token
//! 3. **installations** — Firebase installation (fresh FID); returns an
//!    installation auth token
//! 4. **registrations** — uploads the web-push keys; returns the durable
//!    FCM registration token
//!
//! [`IdentityClient`] covers the first two, [`InstallClient`] the rest.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credentials;
pub mod error;
pub mod fid;
pub mod identity;
pub mod install;

// Re-export main types
pub use credentials::Credentials;
pub use error::RegisterError;
pub use fid::generate_fid;
pub use identity::{DeviceCheckin, IdentityClient};
pub use install::InstallClient;

/// Chrome version advertised at check-in and MCS login.
pub const CHROME_VERSION: &str = "63.0.3234.0";

/// Shared FCM VAPID key used when the application provides none.
pub const FCM_SERVER_KEY: &str =
    "BDOU99-h67HcA6JeFXHbSNMu7e2yNNu3RzoMj8TM4W88jITfq7ZmPvIM1Iv-4_l2LxQcYwhqby2xGpWwzjfAnG4";

/// Firebase installations auth version.
pub const AUTH_VERSION: &str = "FIS_v2";

/// Web SDK version reported to the installations service.
pub const SDK_VERSION: &str = "w:0.6.17";

/// Registration endpoint set; `Default` is the production deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Device check-in endpoint
    pub checkin: String,
    /// GCM `register3` endpoint
    pub register: String,
    /// Firebase installations base (`…/v1`)
    pub installations: String,
    /// FCM registrations base (`…/v1`)
    pub registrations: String,
    /// Legacy send endpoint base; the register3 token is appended
    pub fcm_send: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            checkin: "https://android.clients.google.com/checkin".to_string(),
            register: "https://android.clients.google.com/c2dm/register3".to_string(),
            installations: "https://firebaseinstallations.googleapis.com/v1".to_string(),
            registrations: "https://fcmregistrations.googleapis.com/v1".to_string(),
            fcm_send: "https://fcm.googleapis.com/fcm/send".to_string(),
        }
    }
}

/// Race an endpoint call against cancellation; a fired token aborts the
/// pending I/O and surfaces as [`RegisterError::Cancelled`].
pub(crate) async fn abortable<T>(
    cancel: &tokio_util::sync::CancellationToken,
    call: impl std::future::Future<Output = Result<T, RegisterError>>,
) -> Result<T, RegisterError> {
    tokio::select! {
        result = call => result,
        _ = cancel.cancelled() => Err(RegisterError::Cancelled),
    }
}
