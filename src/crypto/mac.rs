use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Check the 10-byte authentication code that trails the ciphertext.
///
/// The code is HMAC-SHA1 over the ciphertext, truncated to its leftmost
/// bytes. Comparison is constant time.
pub fn verify_auth_code(auth_key: &[u8], ciphertext: &[u8], auth_code: &[u8]) -> Result<()> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(auth_key)
        .map_err(|_| Error::unsupported("invalid authentication key length"))?;
    mac.update(ciphertext);
    mac.verify_truncated_left(auth_code)
        .map_err(|_| Error::Authentication("authentication code mismatch"))
}

/// Compute the truncated authentication code for `ciphertext`.
pub fn auth_code(auth_key: &[u8], ciphertext: &[u8], len: usize) -> Result<Vec<u8>> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(auth_key)
        .map_err(|_| Error::unsupported("invalid authentication key length"))?;
    mac.update(ciphertext);
    let full = mac.finalize().into_bytes();
    Ok(full[..len.min(full.len())].to_vec())
}
