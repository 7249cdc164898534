//! Content-encoding dispatch for incoming data messages.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use push_crypto::{decrypt_aes128gcm, decrypt_aesgcm, CryptoError};
use push_register::Credentials;
use push_wire::proto::mcs::DataMessageStanza;

use crate::error::Error;

const CONTENT_ENCODING: &str = "content-encoding";
const CRYPTO_KEY: &str = "crypto-key";
const ENCRYPTION: &str = "encryption";
const AES128GCM: &str = "aes128gcm";

/// Decrypt a data message, selecting the scheme from its app-data headers.
///
/// `content-encoding: aes128gcm` selects RFC 8188 decryption, which needs
/// only the receiver keys. Anything else is treated as the legacy `aesgcm`
/// draft, with the sender key in `crypto-key: dh=…` and the salt in
/// `encryption: salt=…`.
pub(crate) fn decrypt_message(
    stanza: &DataMessageStanza,
    credentials: &Credentials,
) -> Result<Vec<u8>, Error> {
    let raw_data = stanza.raw_data.as_deref().unwrap_or_default();

    if find_app_data(stanza, CONTENT_ENCODING) == Some(AES128GCM) {
        let plaintext =
            decrypt_aes128gcm(&credentials.private_key, &credentials.auth_secret, raw_data)?;
        return Ok(plaintext);
    }

    let crypto_key = find_app_data(stanza, CRYPTO_KEY)
        .ok_or(Error::Crypto(CryptoError::MissingHeader(CRYPTO_KEY)))?;
    let dh = decode_header_value(crypto_key, "dh=", CRYPTO_KEY)?;
    let encryption = find_app_data(stanza, ENCRYPTION)
        .ok_or(Error::Crypto(CryptoError::MissingHeader(ENCRYPTION)))?;
    let salt = decode_header_value(encryption, "salt=", ENCRYPTION)?;

    let plaintext = decrypt_aesgcm(
        &credentials.private_key,
        &credentials.auth_secret,
        &dh,
        &salt,
        raw_data,
    )?;
    Ok(plaintext)
}

fn find_app_data<'a>(stanza: &'a DataMessageStanza, key: &str) -> Option<&'a str> {
    stanza
        .app_data
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.value.as_str())
}

/// Strip the `dh=`/`salt=` prefix and decode the base64url value. Senders
/// disagree on padding, so trailing `=` is tolerated.
fn decode_header_value(value: &str, prefix: &str, header: &'static str) -> Result<Vec<u8>, Error> {
    let encoded = value
        .strip_prefix(prefix)
        .ok_or(Error::Crypto(CryptoError::MalformedHeader(header)))?;
    URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|_| Error::Crypto(CryptoError::MalformedHeader(header)))
}
