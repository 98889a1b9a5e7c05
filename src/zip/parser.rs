//! Low-level parsing of the backup archive.
//!
//! The archives written by GymRun hold exactly one entry, encrypted with
//! the WinZip AES extension. Parsing happens in two steps:
//!
//! 1. [`ZipParser::locate`] finds the End of Central Directory at the tail,
//!    follows it to the single Central Directory File Header and reads the
//!    authoritative sizes and the AES extra field.
//! 2. [`ZipParser::read_entry`] walks the Local File Header at the start of
//!    the buffer to the payload and slices it into salt, password verifier,
//!    ciphertext and authentication code.

use log::trace;

use crate::error::{Error, Result};

use super::cursor::ByteReader;
use super::structures::*;

/// Parser over a complete archive held in memory.
pub struct ZipParser<'a> {
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find the End of Central Directory record by scanning backwards.
    ///
    /// Returns the offset of the record's signature.
    pub fn find_eocd(&self) -> Result<usize> {
        let last = self
            .data
            .len()
            .checked_sub(EOCD_MIN_SIZE)
            .ok_or_else(|| Error::format("buffer too small to hold an End of Central Directory"))?;

        let signature = EOCD_SIGNATURE.to_le_bytes();
        (0..=last)
            .rev()
            .find(|&i| self.data[i..i + 4] == signature)
            .ok_or_else(|| Error::format("cannot find End of Central Directory"))
    }

    /// Read the archive metadata from the Central Directory.
    pub fn locate(&self) -> Result<ArchiveMetadata> {
        let eocd_offset = self.find_eocd()?;
        let cd_offset =
            ByteReader::at(self.data, eocd_offset + EOCD_CD_OFFSET_FIELD)?.u32()? as usize;
        trace!("EOCD at {}, central directory at {}", eocd_offset, cd_offset);

        let mut cursor = ByteReader::at(self.data, cd_offset)
            .map_err(|_| Error::format("central directory offset points outside the archive"))?;
        if cursor.u32().ok() != Some(CDFH_SIGNATURE) {
            return Err(Error::format("cannot find Central Directory File Header"));
        }

        // Read fixed-size header fields
        let _version_made_by = cursor.u16()?;
        let _version_needed = cursor.u16()?;
        let _flags = cursor.u16()?;
        let compression_method = cursor.u16()?;
        let _last_mod_time = cursor.u16()?;
        let _last_mod_date = cursor.u16()?;
        let _crc32 = cursor.u32()?;
        let compressed_size = cursor.u32()? as u64;
        let uncompressed_size = cursor.u32()? as u64;
        let file_name_length = cursor.u16()? as usize;
        let extra_field_length = cursor.u16()? as usize;

        cursor.seek(cd_offset + CDFH_MIN_SIZE)?;
        cursor.skip(file_name_length)?;
        let extra = cursor.take(extra_field_length)?;

        let aes = Self::parse_aes_extra(extra)?
            .ok_or_else(|| Error::unsupported("entry is not AES encrypted"))?;

        Ok(ArchiveMetadata {
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            aes,
        })
    }

    /// Walk an extra-field block and pick out the AES record, if any.
    ///
    /// Other records are skipped by their declared size; trailing padding
    /// shorter than a record header is ignored.
    pub fn parse_aes_extra(extra: &[u8]) -> Result<Option<AesExtraField>> {
        let mut cursor = ByteReader::new(extra);
        let mut aes = None;

        while cursor.remaining() >= 4 {
            let header_id = cursor.u16()?;
            let data_size = cursor.u16()? as usize;
            let record = cursor.take(data_size).map_err(|_| {
                Error::format(format!(
                    "extra field 0x{:04x} overruns the extra-field block",
                    header_id
                ))
            })?;

            if header_id == AES_EXTRA_FIELD_ID {
                let mut fields = ByteReader::new(record);
                let version = fields.u16()?;
                fields.skip(2)?; // vendor id, "AE"
                let strength = AesStrength::from_u8(fields.u8()?)?;
                let actual_compression_method = CompressionMethod::from_u16(fields.u16()?);
                aes = Some(AesExtraField {
                    version,
                    strength,
                    actual_compression_method,
                });
            }
        }

        Ok(aes)
    }

    /// Offset of the first payload byte of the entry whose Local File Header
    /// starts the archive.
    ///
    /// Only the name and extra lengths are read; the local size fields are
    /// not trusted.
    pub fn data_offset(&self) -> Result<usize> {
        let mut cursor = ByteReader::new(self.data);
        if cursor.u32().ok() != Some(LFH_SIGNATURE) {
            return Err(Error::format("missing Local File Header signature"));
        }

        // version, flags, method, time, date, crc32, compressed, uncompressed
        cursor.skip(2 + 2 + 2 + 2 + 2 + 4 + 4 + 4)?;
        let file_name_length = cursor.u16()? as usize;
        let extra_field_length = cursor.u16()? as usize;

        // Data starts after: LFH (30 bytes) + filename + extra field
        cursor.skip(file_name_length + extra_field_length)?;
        Ok(cursor.position())
    }

    /// Slice the encrypted payload using sizes from the Central Directory.
    pub fn read_entry(&self, meta: &ArchiveMetadata) -> Result<EncryptedEntry<'a>> {
        let salt_len = meta.aes.strength.salt_len();
        let overhead = (salt_len + PASSWORD_VERIFIER_LEN + AUTH_CODE_LEN) as u64;
        if meta.compressed_size <= overhead {
            return Err(Error::format(format!(
                "compressed size {} leaves no room for ciphertext",
                meta.compressed_size
            )));
        }
        let ciphertext_len = usize::try_from(meta.compressed_size - overhead)
            .map_err(|_| Error::format("compressed size does not fit in memory"))?;

        let mut cursor = ByteReader::at(self.data, self.data_offset()?)?;
        let entry = EncryptedEntry {
            salt: cursor.take(salt_len)?,
            password_verifier: cursor.take(PASSWORD_VERIFIER_LEN)?,
            ciphertext: cursor.take(ciphertext_len)?,
            auth_code: cursor.take(AUTH_CODE_LEN)?,
        };

        if entry.stored_len() as u64 != meta.compressed_size {
            return Err(Error::format("entry size does not match the central directory"));
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aes_extra(strength: u8, method: u16) -> Vec<u8> {
        let mut extra = Vec::new();
        extra.extend_from_slice(&AES_EXTRA_FIELD_ID.to_le_bytes());
        extra.extend_from_slice(&7u16.to_le_bytes());
        extra.extend_from_slice(&2u16.to_le_bytes());
        extra.extend_from_slice(b"AE");
        extra.push(strength);
        extra.extend_from_slice(&method.to_le_bytes());
        extra
    }

    /// A minimal single-entry archive whose payload is `payload`.
    fn archive(payload: &[u8], extra: &[u8], compressed_size: u32) -> Vec<u8> {
        let name = b"gymapp.db";
        let mut out = Vec::new();
        out.extend_from_slice(&LFH_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&[0u8; 22]);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(extra);
        out.extend_from_slice(payload);

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&CDFH_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&99u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&compressed_size.to_le_bytes());
        out.extend_from_slice(&1234u32.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 14]);
        out.extend_from_slice(name);
        out.extend_from_slice(extra);

        out.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn locates_metadata_and_slices_entry() {
        let payload: Vec<u8> = (0u8..40).collect();
        let data = archive(&payload, &aes_extra(1, 8), payload.len() as u32);
        let parser = ZipParser::new(&data);

        let meta = parser.locate().unwrap();
        assert_eq!(meta.compression_method, CompressionMethod::Aes);
        assert_eq!(meta.compressed_size, 40);
        assert_eq!(meta.uncompressed_size, 1234);
        assert_eq!(meta.aes.strength, AesStrength::Aes128);
        assert_eq!(meta.aes.actual_compression_method, CompressionMethod::Deflate);

        let entry = parser.read_entry(&meta).unwrap();
        assert_eq!(entry.salt, &payload[0..8]);
        assert_eq!(entry.password_verifier, &payload[8..10]);
        assert_eq!(entry.ciphertext, &payload[10..30]);
        assert_eq!(entry.auth_code, &payload[30..40]);
    }

    #[test]
    fn skips_foreign_extra_records() {
        let mut extra = Vec::new();
        extra.extend_from_slice(&0x5455u16.to_le_bytes());
        extra.extend_from_slice(&5u16.to_le_bytes());
        extra.extend_from_slice(&[1, 2, 3, 4, 5]);
        extra.extend_from_slice(&aes_extra(3, 0));

        let aes = ZipParser::parse_aes_extra(&extra).unwrap().unwrap();
        assert_eq!(aes.version, 2);
        assert_eq!(aes.strength, AesStrength::Aes256);
        assert_eq!(aes.actual_compression_method, CompressionMethod::Stored);
    }

    #[test]
    fn missing_aes_record_is_unsupported() {
        let payload = [0u8; 40];
        let data = archive(&payload, &[], 40);
        assert!(matches!(
            ZipParser::new(&data).locate(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn unknown_strength_is_unsupported() {
        let payload = [0u8; 40];
        let data = archive(&payload, &aes_extra(7, 8), 40);
        assert!(matches!(
            ZipParser::new(&data).locate(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_eocd_is_a_format_error() {
        assert!(matches!(
            ZipParser::new(&[0u8; 10]).locate(),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            ZipParser::new(&[0u8; 64]).locate(),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn bad_central_directory_signature_stops_before_local_header() {
        let payload = [0u8; 40];
        let mut data = archive(&payload, &aes_extra(1, 8), 40);
        let eocd = ZipParser::new(&data).find_eocd().unwrap();
        let cd = u32::from_le_bytes(data[eocd + 16..eocd + 20].try_into().unwrap()) as usize;
        data[cd] = b'X';
        // also break the local header; the error must still name the CDFH
        data[0] = b'X';

        match ZipParser::new(&data).locate() {
            Err(Error::Format(msg)) => assert!(msg.contains("Central Directory")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn central_directory_offset_out_of_range() {
        let payload = [0u8; 40];
        let mut data = archive(&payload, &aes_extra(1, 8), 40);
        let eocd = ZipParser::new(&data).find_eocd().unwrap();
        data[eocd + 16..eocd + 20].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            ZipParser::new(&data).locate(),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn too_small_compressed_size_is_a_format_error() {
        let payload = [0u8; 20];
        let data = archive(&payload, &aes_extra(1, 8), 20);
        let parser = ZipParser::new(&data);
        let meta = parser.locate().unwrap();
        assert!(matches!(parser.read_entry(&meta), Err(Error::Format(_))));
    }

    #[test]
    fn oversized_compressed_size_is_a_format_error() {
        let payload = [0u8; 40];
        let data = archive(&payload, &aes_extra(1, 8), 4000);
        let parser = ZipParser::new(&data);
        let meta = parser.locate().unwrap();
        assert!(matches!(parser.read_entry(&meta), Err(Error::Format(_))));
    }

    #[test]
    fn missing_local_header_is_a_format_error() {
        let payload = [0u8; 40];
        let mut data = archive(&payload, &aes_extra(1, 8), 40);
        data[0] = 0;
        let parser = ZipParser::new(&data);
        let meta = parser.locate().unwrap();
        assert!(matches!(parser.read_entry(&meta), Err(Error::Format(_))));
    }
}
