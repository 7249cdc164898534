//! Firebase installation id generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of characters in a Firebase installation id.
pub const FID_LEN: usize = 22;

/// Generate a Firebase installation id.
///
/// A valid FID is exactly 22 base64url characters (132 bits). 17 random
/// bytes are drawn and the high nibble of the first byte is replaced with
/// the constant `0b0111` header before encoding and truncating.
pub fn generate_fid() -> String {
    let mut bytes = [0u8; 17];
    OsRng.fill_bytes(&mut bytes);
    bytes[0] = 0x70 | (bytes[0] & 0x0f);

    let mut fid = URL_SAFE_NO_PAD.encode(bytes);
    fid.truncate(FID_LEN);
    fid
}
