use flate2::read::DeflateDecoder;
use log::{debug, warn};
use std::io::Read;

use crate::crypto::{ctr, derive_keys, mac};
use crate::error::{Error, Result};

use super::parser::ZipParser;
use super::structures::{ArchiveMetadata, CompressionMethod};

/// Password GymRun uses for every backup it writes.
pub const GYMRUN_PASSWORD: &[u8] = b"13-ImPeRiOn,90#";

/// Knobs for [`ZipExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub password: Vec<u8>,
    /// Check the trailing HMAC before decrypting. When off, only the
    /// 2-byte password verifier guards against a wrong key.
    pub verify_auth_code: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            password: GYMRUN_PASSWORD.to_vec(),
            verify_auth_code: true,
        }
    }
}

/// Decrypts the single entry of a GymRun backup archive.
pub struct ZipExtractor<'a> {
    parser: ZipParser<'a>,
    options: ExtractOptions,
}

impl<'a> ZipExtractor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, ExtractOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: ExtractOptions) -> Self {
        Self {
            parser: ZipParser::new(data),
            options,
        }
    }

    /// Read the archive metadata from the Central Directory.
    pub fn metadata(&self) -> Result<ArchiveMetadata> {
        self.parser.locate()
    }

    /// Extract the entry to memory: verify, decrypt, then inflate.
    pub fn extract_to_memory(&self) -> Result<Vec<u8>> {
        let meta = self.parser.locate()?;
        let entry = self.parser.read_entry(&meta)?;

        debug!(
            "archive: method={} actual_method={} strength={} compressed={} uncompressed={} salt_len={} ciphertext_len={}",
            meta.compression_method.as_u16(),
            meta.aes.actual_compression_method.as_u16(),
            meta.aes.strength.as_u8(),
            meta.compressed_size,
            meta.uncompressed_size,
            entry.salt.len(),
            entry.ciphertext.len()
        );

        let keys = derive_keys(&self.options.password, entry.salt, meta.aes.strength);
        keys.verify_password(entry.password_verifier)?;
        debug!("password verified");

        if self.options.verify_auth_code {
            mac::verify_auth_code(keys.auth_key(), entry.ciphertext, entry.auth_code)?;
            debug!("authentication code verified");
        }

        let plaintext = ctr::decrypt(keys.aes_key(), entry.ciphertext)?;
        debug!("decrypted {} bytes", plaintext.len());

        let method = meta.effective_compression_method();
        debug!("effective compression method: {}", method.as_u16());
        inflate(method, plaintext, meta.uncompressed_size)
    }
}

/// Undo the entry's compression.
///
/// DEFLATE data is raw (no zlib or gzip framing). A size that differs from
/// the Central Directory is logged, not rejected.
pub fn inflate(method: CompressionMethod, data: Vec<u8>, expected_size: u64) -> Result<Vec<u8>> {
    let output = match method {
        CompressionMethod::Stored => data,
        CompressionMethod::Deflate => {
            let mut output = Vec::with_capacity(expected_size.min(1 << 30) as usize);
            DeflateDecoder::new(data.as_slice())
                .read_to_end(&mut output)
                .map_err(Error::Decompression)?;
            output
        }
        other => {
            return Err(Error::unsupported(format!(
                "compression method {}",
                other.as_u16()
            )));
        }
    };

    if output.len() as u64 != expected_size {
        warn!(
            "entry inflated to {} bytes, central directory says {}",
            output.len(),
            expected_size
        );
    }
    Ok(output)
}
