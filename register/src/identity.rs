//! Device check-in and GCM device registration (`register3`).

use prost::Message;
use push_wire::proto::checkin::{
    chrome_build_proto, AndroidCheckinProto, AndroidCheckinRequest, AndroidCheckinResponse,
    ChromeBuildProto, DeviceType,
};
use reqwest::{header, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::form_urlencoded;

use crate::error::RegisterError;
use crate::{abortable, Endpoints, CHROME_VERSION, FCM_SERVER_KEY};

/// Android device identity minted by check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCheckin {
    /// Device id assigned by the server
    pub android_id: u64,
    /// Secret paired with the android id
    pub security_token: u64,
}

/// Client for Google's device identity endpoints.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    app_id: String,
}

impl IdentityClient {
    /// Create an identity client for the given app id.
    pub fn new(http: reqwest::Client, endpoints: Endpoints, app_id: String) -> Self {
        Self {
            http,
            endpoints,
            app_id,
        }
    }

    /// Check in as a Chrome browser, presenting the current identity
    /// (or zeros to mint a fresh one). A 401 means the identity is no
    /// longer accepted. Firing `cancel` aborts the pending call.
    pub async fn check_in(
        &self,
        android_id: u64,
        security_token: u64,
        cancel: &CancellationToken,
    ) -> Result<DeviceCheckin, RegisterError> {
        abortable(cancel, async {
            let request = AndroidCheckinRequest {
                checkin: Some(AndroidCheckinProto {
                    chrome_build: Some(ChromeBuildProto {
                        platform: Some(chrome_build_proto::Platform::Linux as i32),
                        chrome_version: Some(CHROME_VERSION.to_string()),
                        channel: Some(chrome_build_proto::Channel::Stable as i32),
                    }),
                    r#type: Some(DeviceType::ChromeBrowser as i32),
                    user_number: Some(0),
                    ..Default::default()
                }),
                id: Some(android_id as i64),
                security_token: Some(security_token),
                fragment: Some(0),
                version: Some(3),
                user_serial_number: Some(0),
                ..Default::default()
            };

            let response = self
                .http
                .post(&self.endpoints.checkin)
                .header(header::CONTENT_TYPE, "application/x-protobuf")
                .body(request.encode_to_vec())
                .send()
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(RegisterError::Unauthorized);
            }
            let response = require_success(response)?;

            let body = response.bytes().await?;
            let decoded = AndroidCheckinResponse::decode(body.as_ref())?;
            let android_id = decoded
                .android_id
                .ok_or(RegisterError::MissingField("androidId"))?;
            let security_token = decoded
                .security_token
                .ok_or(RegisterError::MissingField("securityToken"))?;
            debug!(android_id, "check-in complete");

            Ok(DeviceCheckin {
                android_id,
                security_token,
            })
        })
        .await
    }

    /// Register the device for GCM delivery (`register3`), yielding the
    /// token the web registration binds to. Firing `cancel` aborts the
    /// pending call.
    pub async fn register_device(
        &self,
        device: &DeviceCheckin,
        cancel: &CancellationToken,
    ) -> Result<String, RegisterError> {
        abortable(cancel, async {
            let device_id = device.android_id.to_string();
            let form = [
                ("app", "org.chromium.linux"),
                ("X-subtype", self.app_id.as_str()),
                ("device", device_id.as_str()),
                ("sender", FCM_SERVER_KEY),
            ];

            let response = self
                .http
                .post(&self.endpoints.register)
                .header(
                    header::AUTHORIZATION,
                    format!("AidLogin {}:{}", device.android_id, device.security_token),
                )
                .form(&form)
                .send()
                .await?;
            let response = require_success(response)?;

            let body = response.text().await?;
            let mut token = None;
            let mut error = None;
            for (key, value) in form_urlencoded::parse(body.as_bytes()) {
                match key.as_ref() {
                    "token" => token = Some(value.into_owned()),
                    "Error" => error = Some(value.into_owned()),
                    _ => {}
                }
            }
            // the endpoint reports failures in-band with a 200
            if let Some(error) = error {
                return Err(RegisterError::Rejected(error));
            }
            debug!("device registered for GCM delivery");
            token.ok_or(RegisterError::MissingField("token"))
        })
        .await
    }
}

pub(crate) fn require_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, RegisterError> {
    if !response.status().is_success() {
        return Err(RegisterError::Status(response.status()));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_server, CannedResponse};
    use std::time::Duration;

    fn endpoints_for(addr: std::net::SocketAddr) -> Endpoints {
        let base = format!("http://{addr}");
        Endpoints {
            checkin: format!("{base}/checkin"),
            register: format!("{base}/c2dm/register3"),
            ..Endpoints::default()
        }
    }

    fn checkin_body(android_id: u64, security_token: u64) -> Vec<u8> {
        AndroidCheckinResponse {
            stats_ok: true,
            android_id: Some(android_id),
            security_token: Some(security_token),
            ..Default::default()
        }
        .encode_to_vec()
    }

    #[tokio::test]
    async fn check_in_roundtrips_identity() {
        let addr = spawn_server(|request_line, body| {
            assert!(request_line.starts_with("POST /checkin"), "{request_line}");
            // the request must carry the Chrome fingerprint
            let decoded = AndroidCheckinRequest::decode(body).unwrap();
            let checkin = decoded.checkin.unwrap();
            assert_eq!(checkin.r#type, Some(DeviceType::ChromeBrowser as i32));
            let build = checkin.chrome_build.unwrap();
            assert_eq!(build.platform, Some(chrome_build_proto::Platform::Linux as i32));
            assert_eq!(build.chrome_version.as_deref(), Some(CHROME_VERSION));
            assert_eq!(decoded.version, Some(3));
            assert_eq!(decoded.id, Some(0));
            assert_eq!(decoded.security_token, Some(0));
            CannedResponse::new(200, "application/x-protobuf", checkin_body(1234, 5678))
        })
        .await;

        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );
        let device = client
            .check_in(0, 0, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(device.android_id, 1234);
        assert_eq!(device.security_token, 5678);
    }

    #[tokio::test]
    async fn check_in_maps_401_to_unauthorized() {
        let addr = spawn_server(|_, _| CannedResponse::new(401, "text/plain", b"nope".to_vec()))
            .await;
        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );
        assert!(matches!(
            client.check_in(1234, 5678, &CancellationToken::new()).await,
            Err(RegisterError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn check_in_maps_other_statuses_to_status_error() {
        let addr = spawn_server(|_, _| CannedResponse::new(500, "text/plain", Vec::new())).await;
        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );
        assert!(matches!(
            client.check_in(0, 0, &CancellationToken::new()).await,
            Err(RegisterError::Status(status)) if status.as_u16() == 500
        ));
    }

    #[tokio::test]
    async fn register_device_extracts_token() {
        let addr = spawn_server(|request_line, body| {
            assert!(
                request_line.starts_with("POST /c2dm/register3"),
                "{request_line}"
            );
            let form = String::from_utf8_lossy(body).into_owned();
            assert!(form.contains("app=org.chromium.linux"), "{form}");
            assert!(form.contains("device=1234"), "{form}");
            CannedResponse::new(200, "text/plain", b"token=abc".to_vec())
        })
        .await;

        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );
        let token = client
            .register_device(
                &DeviceCheckin {
                    android_id: 1234,
                    security_token: 5678,
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn register_device_surfaces_in_band_errors() {
        let addr = spawn_server(|_, _| {
            CannedResponse::new(200, "text/plain", b"Error=PHONE_REGISTRATION_ERROR".to_vec())
        })
        .await;
        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );
        match client
            .register_device(
                &DeviceCheckin {
                    android_id: 1,
                    security_token: 2,
                },
                &CancellationToken::new(),
            )
            .await
        {
            Err(RegisterError::Rejected(reason)) => {
                assert_eq!(reason, "PHONE_REGISTRATION_ERROR");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_aborts_a_pending_check_in() {
        // a server that accepts the connection and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _keep = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = IdentityClient::new(
            reqwest::Client::new(),
            endpoints_for(addr),
            "app".to_string(),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            client.check_in(0, 0, &cancel),
        )
        .await
        .expect("cancellation must abort the hung call");
        assert!(matches!(result, Err(RegisterError::Cancelled)));
    }
}
