//! Persisted FCM credentials.

use serde::{Deserialize, Serialize};

/// Credentials minted by registration and reused across connections.
///
/// Serializes to the layout embedders persist: camelCase keys with byte
/// fields base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Firebase app id the credentials are bound to
    pub app_id: String,
    /// Device identity from check-in
    pub android_id: u64,
    /// Secret paired with the android id
    pub security_token: u64,
    /// Durable FCM registration token addressing this endpoint
    pub token: String,
    /// P-256 private scalar, canonical octets
    #[serde(with = "base64_bytes")]
    pub private_key: Vec<u8>,
    /// Uncompressed SEC1 public point (`p256dh`)
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// 16-byte web-push auth secret
    #[serde(with = "base64_bytes")]
    pub auth_secret: Vec<u8>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
