//! AES in the counter arrangement used by WinZip AES.
//!
//! The counter is a 128-bit **little-endian** integer that starts at 1 and
//! is bumped once per 16-byte block. Library CTR modes count big-endian
//! from the nonce, so the keystream is built here one block at a time from
//! raw AES block encryption.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};

use crate::error::{Error, Result};

pub const BLOCK_SIZE: usize = 16;

enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &[u8]) -> Result<Self> {
        let invalid = |_| Error::unsupported(format!("AES key length {}", key.len()));
        Ok(match key.len() {
            16 => Self::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
            24 => Self::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
            32 => Self::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
            _ => return Err(Error::unsupported(format!("AES key length {}", key.len()))),
        })
    }

    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(cipher) => cipher.encrypt_block(block),
            Self::Aes192(cipher) => cipher.encrypt_block(block),
            Self::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }
}

/// Counter block for the 0-based block `index`: `index + 1`, little-endian.
pub fn counter_block(index: u64) -> [u8; BLOCK_SIZE] {
    (u128::from(index) + 1).to_le_bytes()
}

/// XOR the keystream into `data` in place. Encryption and decryption are
/// the same operation.
pub fn apply_keystream(key: &[u8], data: &mut [u8]) -> Result<()> {
    let cipher = BlockCipher::new(key)?;

    for (index, chunk) in data.chunks_mut(BLOCK_SIZE).enumerate() {
        let mut keystream = Block::from(counter_block(index as u64));
        cipher.encrypt_block(&mut keystream);
        // the final chunk may be short; zip stops at its end
        for (byte, key_byte) in chunk.iter_mut().zip(keystream.iter()) {
            *byte ^= key_byte;
        }
    }

    Ok(())
}

/// Decrypt `ciphertext` into a new buffer of the same length.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut plaintext = ciphertext.to_vec();
    apply_keystream(key, &mut plaintext)?;
    Ok(plaintext)
}
