use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::zip::{AesStrength, PASSWORD_VERIFIER_LEN};

/// PBKDF2 iteration count fixed by the WinZip AES format.
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// Key material for one entry, sliced from a single PBKDF2 output.
///
/// Recomputed per decryption and wiped on drop.
pub struct DerivedKeys {
    material: Zeroizing<Vec<u8>>,
    key_len: usize,
}

impl DerivedKeys {
    pub fn aes_key(&self) -> &[u8] {
        &self.material[..self.key_len]
    }

    pub fn auth_key(&self) -> &[u8] {
        &self.material[self.key_len..2 * self.key_len]
    }

    pub fn password_verifier(&self) -> &[u8] {
        &self.material[2 * self.key_len..]
    }

    /// Compare the derived verifier against the one stored in the archive.
    pub fn verify_password(&self, stored: &[u8]) -> Result<()> {
        if self.password_verifier() != stored {
            return Err(Error::Authentication("password verifier mismatch"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}

/// Derive the AES key, the HMAC key and the password verifier.
pub fn derive_keys(password: &[u8], salt: &[u8], strength: AesStrength) -> DerivedKeys {
    let key_len = strength.key_len();
    let mut material = Zeroizing::new(vec![0u8; 2 * key_len + PASSWORD_VERIFIER_LEN]);
    pbkdf2_hmac::<Sha1>(password, salt, PBKDF2_ITERATIONS, material.as_mut_slice());
    DerivedKeys { material, key_len }
}
