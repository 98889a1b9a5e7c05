use crate::error::{Error, Result};

/// End of Central Directory signature (`PK\x05\x06`).
pub const EOCD_SIGNATURE: u32 = 0x06054b50;
/// Minimum EOCD size: a record with an empty comment.
pub const EOCD_MIN_SIZE: usize = 22;
/// Offset of the Central Directory offset field inside the EOCD.
pub const EOCD_CD_OFFSET_FIELD: usize = 16;

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: u32 = 0x02014b50;
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: u32 = 0x04034b50;
pub const LFH_SIZE: usize = 30;

/// Extra field id of the WinZip AES extension.
pub const AES_EXTRA_FIELD_ID: u16 = 0x9901;
/// Length of the password verification value stored before the ciphertext.
pub const PASSWORD_VERIFIER_LEN: usize = 2;
/// Length of the truncated HMAC-SHA1 trailing the ciphertext.
pub const AUTH_CODE_LEN: usize = 10;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    /// WinZip AES; the real method lives in the AES extra field.
    Aes,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            99 => CompressionMethod::Aes,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Aes => 99,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// AES key strength as recorded in the AES extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesStrength {
    Aes128,
    Aes192,
    Aes256,
}

impl AesStrength {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(AesStrength::Aes128),
            2 => Ok(AesStrength::Aes192),
            3 => Ok(AesStrength::Aes256),
            other => Err(Error::unsupported(format!("AES strength {}", other))),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            AesStrength::Aes128 => 1,
            AesStrength::Aes192 => 2,
            AesStrength::Aes256 => 3,
        }
    }

    pub fn salt_len(&self) -> usize {
        match self {
            AesStrength::Aes128 => 8,
            AesStrength::Aes192 => 12,
            AesStrength::Aes256 => 16,
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            AesStrength::Aes128 => 16,
            AesStrength::Aes192 => 24,
            AesStrength::Aes256 => 32,
        }
    }
}

/// Contents of the WinZip AES extra field (`0x9901`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesExtraField {
    /// AE-1 or AE-2; recorded but not acted upon.
    pub version: u16,
    pub strength: AesStrength,
    pub actual_compression_method: CompressionMethod,
}

/// Archive facts taken from the Central Directory.
///
/// Sizes come from the Central Directory only. The local header may defer
/// them to a trailing data descriptor and leave zeros behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMetadata {
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub aes: AesExtraField,
}

impl ArchiveMetadata {
    /// The method the decrypted bytes are actually stored with.
    pub fn effective_compression_method(&self) -> CompressionMethod {
        if self.compression_method == CompressionMethod::Aes {
            self.aes.actual_compression_method
        } else {
            self.compression_method
        }
    }
}

/// The encrypted payload of the single archive entry, sliced out of the
/// archive buffer.
#[derive(Debug, Clone, Copy)]
pub struct EncryptedEntry<'a> {
    pub salt: &'a [u8],
    pub password_verifier: &'a [u8],
    pub ciphertext: &'a [u8],
    pub auth_code: &'a [u8],
}

impl EncryptedEntry<'_> {
    /// Total on-disk size; equals the Central Directory compressed size.
    pub fn stored_len(&self) -> usize {
        self.salt.len() + self.password_verifier.len() + self.ciphertext.len() + self.auth_code.len()
    }
}
