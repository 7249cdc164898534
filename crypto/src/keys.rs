//! Receiver key material for web-push subscriptions.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of the auth secret shared with the push service.
pub const AUTH_SECRET_LEN: usize = 16;

/// Length of a P-256 private scalar in canonical octet form.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Length of an uncompressed SEC1 P-256 point.
pub const PUBLIC_KEY_LEN: usize = 65;

/// P-256 keypair plus auth secret identifying one web-push subscription.
///
/// The private key is the canonical 32-byte scalar encoding; the public key
/// is the uncompressed 65-byte SEC1 point handed to the push service as
/// `p256dh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPushKeys {
    /// Private scalar, canonical octets
    pub private_key: Vec<u8>,
    /// Uncompressed SEC1 public point
    pub public_key: Vec<u8>,
    /// Secret mixed into the HTTP-ECE key schedule
    pub auth_secret: Vec<u8>,
}

impl WebPushKeys {
    /// Generate fresh key material from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();

        let mut auth_secret = vec![0u8; AUTH_SECRET_LEN];
        OsRng.fill_bytes(&mut auth_secret);

        Self {
            private_key: secret.to_bytes().to_vec(),
            public_key: public.to_encoded_point(false).as_bytes().to_vec(),
            auth_secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_material_has_canonical_encodings() {
        let keys = WebPushKeys::generate();
        assert_eq!(keys.private_key.len(), PRIVATE_KEY_LEN);
        assert_eq!(keys.public_key.len(), PUBLIC_KEY_LEN);
        // uncompressed SEC1 marker
        assert_eq!(keys.public_key[0], 0x04);
        assert_eq!(keys.auth_secret.len(), AUTH_SECRET_LEN);
    }

    #[test]
    fn private_key_roundtrips_through_scalar_octets() {
        let keys = WebPushKeys::generate();
        let secret = SecretKey::from_slice(&keys.private_key).unwrap();
        assert_eq!(secret.to_bytes().to_vec(), keys.private_key);
        assert_eq!(
            secret
                .public_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
            keys.public_key
        );
    }

    #[test]
    fn successive_keys_are_distinct() {
        let a = WebPushKeys::generate();
        let b = WebPushKeys::generate();
        assert_ne!(a.private_key, b.private_key);
        assert_ne!(a.auth_secret, b.auth_secret);
    }
}
