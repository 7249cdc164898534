//! HTTP encrypted-content-encoding for web push.
//!
//! `aes128gcm` follows RFC 8188 with the RFC 8291 key schedule; the only
//! inputs a receiver needs are its private key and auth secret, since salt
//! and sender public key ride in the payload header. The legacy `aesgcm`
//! draft keeps those two values in message headers instead and pads records
//! with a leading two-byte length.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::CryptoError;
use crate::keys::AUTH_SECRET_LEN;

const KEY_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const SALT_LEN: usize = 16;

/// Record size written by the encryption direction.
const DEFAULT_RECORD_SIZE: u32 = 4096;
/// Smallest record size RFC 8188 permits.
const MIN_RECORD_SIZE: u32 = 18;

const AES128GCM_KEY_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";
const WEB_PUSH_IKM_INFO: &[u8] = b"WebPush: info\0";
const AESGCM_AUTH_INFO: &[u8] = b"Content-Encoding: auth\0";
const AESGCM_KEY_INFO: &[u8] = b"Content-Encoding: aesgcm\0";

/// A legacy `aesgcm` ciphertext with its out-of-band parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesGcmMessage {
    /// Sender's ephemeral public key (the `dh=` header value)
    pub dh: Vec<u8>,
    /// Random salt (the `salt=` header value)
    pub salt: Vec<u8>,
    /// Encrypted records
    pub body: Vec<u8>,
}

fn check_auth_secret(auth_secret: &[u8]) -> Result<(), CryptoError> {
    if auth_secret.len() != AUTH_SECRET_LEN {
        return Err(CryptoError::InvalidAuthSecret(auth_secret.len()));
    }
    Ok(())
}

/// ECDH between our private scalar and the peer's SEC1 point; also returns
/// our own uncompressed public key for the key-schedule info strings.
fn shared_secret(private_key: &[u8], peer_public: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let secret = SecretKey::from_slice(private_key).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let peer = PublicKey::from_sec1_bytes(peer_public).map_err(|_| CryptoError::InvalidPublicKey)?;
    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let own_public = secret
        .public_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();
    Ok((shared.raw_secret_bytes().to_vec(), own_public))
}

fn derive_nonce(base: &[u8; NONCE_LEN], seq: u64) -> [u8; NONCE_LEN] {
    let mut nonce = *base;
    for (slot, byte) in nonce[NONCE_LEN - 8..].iter_mut().zip(seq.to_be_bytes()) {
        *slot ^= byte;
    }
    nonce
}

/// RFC 8291 content-encryption key and nonce base.
fn aes128gcm_schedule(
    ecdh_secret: &[u8],
    auth_secret: &[u8],
    receiver_public: &[u8],
    sender_public: &[u8],
    salt: &[u8],
) -> Result<([u8; KEY_LEN], [u8; NONCE_LEN]), CryptoError> {
    let mut ikm_info = Vec::with_capacity(WEB_PUSH_IKM_INFO.len() + 2 * 65);
    ikm_info.extend_from_slice(WEB_PUSH_IKM_INFO);
    ikm_info.extend_from_slice(receiver_public);
    ikm_info.extend_from_slice(sender_public);

    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth_secret), ecdh_secret)
        .expand(&ikm_info, &mut ikm)
        .map_err(|_| CryptoError::Hkdf)?;

    let hk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; KEY_LEN];
    hk.expand(AES128GCM_KEY_INFO, &mut cek)
        .map_err(|_| CryptoError::Hkdf)?;
    let mut nonce = [0u8; NONCE_LEN];
    hk.expand(NONCE_INFO, &mut nonce)
        .map_err(|_| CryptoError::Hkdf)?;
    Ok((cek, nonce))
}

/// Decrypt an RFC 8188 `aes128gcm` payload.
///
/// Only the receiver's private key and auth secret are required; salt and
/// the sender's public key are parsed out of the payload header.
pub fn decrypt_aes128gcm(
    private_key: &[u8],
    auth_secret: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_auth_secret(auth_secret)?;
    if payload.len() < SALT_LEN + 4 + 1 {
        return Err(CryptoError::Truncated("header"));
    }
    let salt = &payload[..SALT_LEN];
    let rs = u32::from_be_bytes([
        payload[SALT_LEN],
        payload[SALT_LEN + 1],
        payload[SALT_LEN + 2],
        payload[SALT_LEN + 3],
    ]);
    if rs < MIN_RECORD_SIZE {
        return Err(CryptoError::RecordSize(rs));
    }
    let key_id_len = payload[SALT_LEN + 4] as usize;
    let body_start = SALT_LEN + 5 + key_id_len;
    if payload.len() < body_start {
        return Err(CryptoError::Truncated("key id"));
    }
    let sender_public = &payload[SALT_LEN + 5..body_start];
    let body = &payload[body_start..];
    if body.is_empty() {
        return Err(CryptoError::Truncated("records"));
    }

    let (ecdh_secret, receiver_public) = shared_secret(private_key, sender_public)?;
    let (cek, base_nonce) = aes128gcm_schedule(
        &ecdh_secret,
        auth_secret,
        &receiver_public,
        sender_public,
        salt,
    )?;
    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| CryptoError::Aead)?;

    let mut plaintext = Vec::with_capacity(body.len());
    let mut records = body.chunks(rs as usize).enumerate().peekable();
    while let Some((seq, record)) = records.next() {
        if record.len() <= TAG_LEN {
            return Err(CryptoError::Truncated("record"));
        }
        let nonce = derive_nonce(&base_nonce, seq as u64);
        let mut chunk = cipher
            .decrypt(Nonce::from_slice(&nonce), record)
            .map_err(|_| CryptoError::Aead)?;

        // strip trailing zeros, then the 0x01/0x02 delimiter
        let delimiter_index = chunk
            .iter()
            .rposition(|&byte| byte != 0)
            .ok_or(CryptoError::Padding)?;
        let expected = if records.peek().is_none() { 2 } else { 1 };
        if chunk[delimiter_index] != expected {
            return Err(CryptoError::Padding);
        }
        chunk.truncate(delimiter_index);
        plaintext.extend_from_slice(&chunk);
    }
    Ok(plaintext)
}

/// Encrypt a payload for the given receiver keys as RFC 8188 `aes128gcm`,
/// using a fresh ephemeral sender key and salt.
pub fn encrypt_aes128gcm(
    receiver_public: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_auth_secret(auth_secret)?;
    let receiver =
        PublicKey::from_sec1_bytes(receiver_public).map_err(|_| CryptoError::InvalidPublicKey)?;

    let sender_secret = SecretKey::random(&mut OsRng);
    let sender_public = sender_secret
        .public_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();
    let shared =
        p256::ecdh::diffie_hellman(sender_secret.to_nonzero_scalar(), receiver.as_affine());

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let (cek, base_nonce) = aes128gcm_schedule(
        shared.raw_secret_bytes(),
        auth_secret,
        receiver_public,
        &sender_public,
        &salt,
    )?;
    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| CryptoError::Aead)?;

    let rs = DEFAULT_RECORD_SIZE as usize;
    let data_per_record = rs - TAG_LEN - 1;

    let mut payload = Vec::with_capacity(SALT_LEN + 5 + sender_public.len() + plaintext.len() + rs);
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&DEFAULT_RECORD_SIZE.to_be_bytes());
    payload.push(sender_public.len() as u8);
    payload.extend_from_slice(&sender_public);

    let mut offset = 0;
    let mut seq = 0u64;
    loop {
        let end = usize::min(offset + data_per_record, plaintext.len());
        let last = end == plaintext.len();

        let mut record = Vec::with_capacity(end - offset + 1);
        record.extend_from_slice(&plaintext[offset..end]);
        record.push(if last { 2 } else { 1 });

        let nonce = derive_nonce(&base_nonce, seq);
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), record.as_slice())
            .map_err(|_| CryptoError::Aead)?;
        payload.extend_from_slice(&sealed);

        if last {
            break;
        }
        offset = end;
        seq += 1;
    }
    Ok(payload)
}

/// Key-derivation context shared by the legacy `aesgcm` cek and nonce infos.
fn aesgcm_context(receiver_public: &[u8], sender_public: &[u8]) -> Vec<u8> {
    let mut context = Vec::with_capacity(6 + 2 + receiver_public.len() + 2 + sender_public.len());
    context.extend_from_slice(b"P-256\0");
    context.extend_from_slice(&(receiver_public.len() as u16).to_be_bytes());
    context.extend_from_slice(receiver_public);
    context.extend_from_slice(&(sender_public.len() as u16).to_be_bytes());
    context.extend_from_slice(sender_public);
    context
}

fn aesgcm_schedule(
    ecdh_secret: &[u8],
    auth_secret: &[u8],
    receiver_public: &[u8],
    sender_public: &[u8],
    salt: &[u8],
) -> Result<([u8; KEY_LEN], [u8; NONCE_LEN]), CryptoError> {
    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth_secret), ecdh_secret)
        .expand(AESGCM_AUTH_INFO, &mut ikm)
        .map_err(|_| CryptoError::Hkdf)?;

    let context = aesgcm_context(receiver_public, sender_public);
    let mut cek_info = Vec::with_capacity(AESGCM_KEY_INFO.len() + context.len());
    cek_info.extend_from_slice(AESGCM_KEY_INFO);
    cek_info.extend_from_slice(&context);
    let mut nonce_info = Vec::with_capacity(NONCE_INFO.len() + context.len());
    nonce_info.extend_from_slice(NONCE_INFO);
    nonce_info.extend_from_slice(&context);

    let hk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; KEY_LEN];
    hk.expand(&cek_info, &mut cek)
        .map_err(|_| CryptoError::Hkdf)?;
    let mut nonce = [0u8; NONCE_LEN];
    hk.expand(&nonce_info, &mut nonce)
        .map_err(|_| CryptoError::Hkdf)?;
    Ok((cek, nonce))
}

/// Decrypt a legacy `aesgcm` body given the out-of-band `dh` sender key and
/// `salt` header values.
pub fn decrypt_aesgcm(
    private_key: &[u8],
    auth_secret: &[u8],
    dh: &[u8],
    salt: &[u8],
    body: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_auth_secret(auth_secret)?;
    if salt.len() != SALT_LEN {
        return Err(CryptoError::InvalidSalt(salt.len()));
    }
    if body.is_empty() {
        return Err(CryptoError::Truncated("records"));
    }

    let (ecdh_secret, receiver_public) = shared_secret(private_key, dh)?;
    let (cek, base_nonce) =
        aesgcm_schedule(&ecdh_secret, auth_secret, &receiver_public, dh, salt)?;
    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| CryptoError::Aead)?;

    let record_len = DEFAULT_RECORD_SIZE as usize + TAG_LEN;
    let mut plaintext = Vec::with_capacity(body.len());
    for (seq, record) in body.chunks(record_len).enumerate() {
        let nonce = derive_nonce(&base_nonce, seq as u64);
        let chunk = cipher
            .decrypt(Nonce::from_slice(&nonce), record)
            .map_err(|_| CryptoError::Aead)?;

        // records start with a two-byte pad length followed by that many zeros
        if chunk.len() < 2 {
            return Err(CryptoError::Padding);
        }
        let pad_len = u16::from_be_bytes([chunk[0], chunk[1]]) as usize;
        if chunk.len() < 2 + pad_len || chunk[2..2 + pad_len].iter().any(|&byte| byte != 0) {
            return Err(CryptoError::Padding);
        }
        plaintext.extend_from_slice(&chunk[2 + pad_len..]);
    }
    Ok(plaintext)
}

/// Encrypt a payload for the given receiver keys as legacy `aesgcm`,
/// returning the ciphertext together with its `dh` and `salt` headers.
pub fn encrypt_aesgcm(
    receiver_public: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
) -> Result<AesGcmMessage, CryptoError> {
    check_auth_secret(auth_secret)?;
    let receiver =
        PublicKey::from_sec1_bytes(receiver_public).map_err(|_| CryptoError::InvalidPublicKey)?;

    let sender_secret = SecretKey::random(&mut OsRng);
    let sender_public = sender_secret
        .public_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();
    let shared =
        p256::ecdh::diffie_hellman(sender_secret.to_nonzero_scalar(), receiver.as_affine());

    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let (cek, base_nonce) = aesgcm_schedule(
        shared.raw_secret_bytes(),
        auth_secret,
        receiver_public,
        &sender_public,
        &salt,
    )?;
    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| CryptoError::Aead)?;

    let data_per_record = DEFAULT_RECORD_SIZE as usize - 2;
    let mut body = Vec::with_capacity(plaintext.len() + 2 + TAG_LEN);
    let mut offset = 0;
    let mut seq = 0u64;
    loop {
        let end = usize::min(offset + data_per_record, plaintext.len());

        let mut record = Vec::with_capacity(end - offset + 2);
        record.extend_from_slice(&0u16.to_be_bytes());
        record.extend_from_slice(&plaintext[offset..end]);

        let nonce = derive_nonce(&base_nonce, seq);
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), record.as_slice())
            .map_err(|_| CryptoError::Aead)?;
        body.extend_from_slice(&sealed);

        if end == plaintext.len() {
            break;
        }
        offset = end;
        seq += 1;
    }

    Ok(AesGcmMessage {
        dh: sender_public,
        salt,
        body,
    })
}
