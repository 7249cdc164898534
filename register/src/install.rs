//! Firebase installations and FCM registration exchanges.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use push_crypto::WebPushKeys;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::RegisterError;
use crate::fid::generate_fid;
use crate::identity::require_success;
use crate::{abortable, Endpoints, AUTH_VERSION, FCM_SERVER_KEY, SDK_VERSION};

#[derive(Debug, Deserialize)]
struct AuthToken {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallResponse {
    auth_token: AuthToken,
}

#[derive(Debug, Deserialize)]
struct WebRegistration {
    token: String,
}

/// Client for the Firebase installations and FCM registrations services.
#[derive(Debug, Clone)]
pub struct InstallClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    api_key: String,
    project_id: String,
    app_id: String,
    vapid_key: String,
}

impl InstallClient {
    /// Create an install client; `vapid_key` falls back to the shared FCM
    /// server key when the application provides none.
    pub fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        api_key: String,
        project_id: String,
        app_id: String,
        vapid_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoints,
            api_key,
            project_id,
            app_id,
            vapid_key: vapid_key.unwrap_or_else(|| FCM_SERVER_KEY.to_string()),
        }
    }

    /// Create a Firebase installation under a fresh FID, yielding the
    /// short-lived auth token the registration call needs. Firing `cancel`
    /// aborts the pending call.
    pub async fn install(&self, cancel: &CancellationToken) -> Result<String, RegisterError> {
        abortable(cancel, async {
            let fid = generate_fid();
            let body = json!({
                "appId": self.app_id,
                "authVersion": AUTH_VERSION,
                "fid": fid,
                "sdkVersion": SDK_VERSION,
            });

            let url = format!(
                "{}/projects/{}/installations",
                self.endpoints.installations, self.project_id
            );
            let response = self
                .http
                .post(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;
            let response = require_success(response)?;

            let install: InstallResponse = response.json().await?;
            debug!(%fid, "Firebase installation created");
            Ok(install.auth_token.token)
        })
        .await
    }

    /// Upload the web-push keys, binding them to the GCM token; yields the
    /// durable FCM registration token stored in credentials. Firing
    /// `cancel` aborts the pending call.
    pub async fn register_web(
        &self,
        gcm_token: &str,
        keys: &WebPushKeys,
        installation_token: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RegisterError> {
        abortable(cancel, async {
            let body = json!({
                "web": {
                    "applicationPubKey": self.vapid_key,
                    "endpoint": format!("{}/{}", self.endpoints.fcm_send, gcm_token),
                    "p256dh": URL_SAFE_NO_PAD.encode(&keys.public_key),
                    "auth": URL_SAFE_NO_PAD.encode(&keys.auth_secret),
                }
            });

            let url = format!(
                "{}/projects/{}/registrations",
                self.endpoints.registrations, self.project_id
            );
            let response = self
                .http
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .header(
                    "x-goog-firebase-installations-auth",
                    format!("FIS {installation_token}"),
                )
                .json(&body)
                .send()
                .await?;
            let response = require_success(response)?;

            let registration: WebRegistration = response.json().await?;
            debug!("web-push registration complete");
            Ok(registration.token)
        })
        .await
    }
}
