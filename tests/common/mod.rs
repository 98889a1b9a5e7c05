//! Builds single-entry WinZip AES archives the way GymRun writes them.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use rusqlite::Connection;
use std::io::Write;
use tempfile::TempDir;

use gymrun::crypto::{ctr, derive_keys, mac};
use gymrun::zip::{AES_EXTRA_FIELD_ID, AUTH_CODE_LEN, AesStrength, CompressionMethod};

pub struct ArchiveSpec<'a> {
    pub password: &'a [u8],
    pub strength: AesStrength,
    pub method: CompressionMethod,
    /// Leave sizes out of the local header and append a data descriptor.
    pub data_descriptor: bool,
}

impl Default for ArchiveSpec<'_> {
    fn default() -> Self {
        Self {
            password: gymrun::GYMRUN_PASSWORD,
            strength: AesStrength::Aes256,
            method: CompressionMethod::Deflate,
            data_descriptor: true,
        }
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Encrypt `plaintext` into a complete archive.
pub fn build_archive(plaintext: &[u8], spec: &ArchiveSpec<'_>) -> Vec<u8> {
    let salt: Vec<u8> = (0..spec.strength.salt_len() as u8).map(|i| i * 7 + 1).collect();
    let keys = derive_keys(spec.password, &salt, spec.strength);

    let mut body = match spec.method {
        CompressionMethod::Deflate => deflate(plaintext),
        _ => plaintext.to_vec(),
    };
    ctr::apply_keystream(keys.aes_key(), &mut body).unwrap();
    let tag = mac::auth_code(keys.auth_key(), &body, AUTH_CODE_LEN).unwrap();

    let mut payload = salt.clone();
    payload.extend_from_slice(keys.password_verifier());
    payload.extend_from_slice(&body);
    payload.extend_from_slice(&tag);

    let name = b"gymapp.db";
    let mut extra = Vec::new();
    extra.extend_from_slice(&AES_EXTRA_FIELD_ID.to_le_bytes());
    extra.extend_from_slice(&7u16.to_le_bytes());
    extra.extend_from_slice(&2u16.to_le_bytes());
    extra.extend_from_slice(b"AE");
    extra.push(spec.strength.as_u8());
    extra.extend_from_slice(&spec.method.as_u16().to_le_bytes());

    let flags: u16 = if spec.data_descriptor { 0x0009 } else { 0x0001 };
    let (local_compressed, local_uncompressed) = if spec.data_descriptor {
        (0, 0)
    } else {
        (payload.len() as u32, plaintext.len() as u32)
    };

    let mut out = Vec::new();
    out.extend_from_slice(&0x04034b50u32.to_le_bytes());
    out.extend_from_slice(&51u16.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&99u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0x21u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&local_compressed.to_le_bytes());
    out.extend_from_slice(&local_uncompressed.to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&extra);
    out.extend_from_slice(&payload);
    if spec.data_descriptor {
        out.extend_from_slice(&0x08074b50u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(plaintext.len() as u32).to_le_bytes());
    }

    let cd_offset = out.len() as u32;
    let mut cd = Vec::new();
    cd.extend_from_slice(&0x02014b50u32.to_le_bytes());
    cd.extend_from_slice(&51u16.to_le_bytes());
    cd.extend_from_slice(&51u16.to_le_bytes());
    cd.extend_from_slice(&flags.to_le_bytes());
    cd.extend_from_slice(&99u16.to_le_bytes());
    cd.extend_from_slice(&0u16.to_le_bytes());
    cd.extend_from_slice(&0x21u16.to_le_bytes());
    cd.extend_from_slice(&0u32.to_le_bytes());
    cd.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    cd.extend_from_slice(&(plaintext.len() as u32).to_le_bytes());
    cd.extend_from_slice(&(name.len() as u16).to_le_bytes());
    cd.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    cd.extend_from_slice(&[0u8; 14]);
    cd.extend_from_slice(name);
    cd.extend_from_slice(&extra);

    out.extend_from_slice(&cd);
    out.extend_from_slice(&0x06054b50u32.to_le_bytes());
    out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
    out.extend_from_slice(&(cd.len() as u32).to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

/// Offset of the first payload byte (the salt) in a built archive.
pub fn payload_offset(archive: &[u8]) -> usize {
    let name_len = u16::from_le_bytes([archive[26], archive[27]]) as usize;
    let extra_len = u16::from_le_bytes([archive[28], archive[29]]) as usize;
    30 + name_len + extra_len
}

/// A gymapp.db with two workouts; the later one holds three exercises.
pub fn workout_database() -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gymapp.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE exercise (_id INTEGER PRIMARY KEY, xlabel TEXT, unit TEXT);
             CREATE TABLE entry (_id INTEGER PRIMARY KEY, exercise INTEGER, time INTEGER, data TEXT);
             CREATE TABLE workout (_id INTEGER PRIMARY KEY, time_start INTEGER, time_end INTEGER);
             INSERT INTO exercise VALUES (1, 'Squat', '1'), (2, 'Bench Press', '2'), (3, 'Pull Up', NULL);
             INSERT INTO workout VALUES (1, 1000, 1900), (2, 5000, 6000);
             INSERT INTO entry VALUES (1, 1, 1500, '3-1,4-80,5-5');
             INSERT INTO entry VALUES (2, 1, 5100, '3-2,4-102.5,5-5');
             INSERT INTO entry VALUES (3, 2, 5200, '3-1,4-45.5,5-10');
             INSERT INTO entry VALUES (4, 1, 5300, '3-1,4-100,5-5');
             INSERT INTO entry VALUES (5, 3, 5400, '3-1,5-8,52-2,x-y');",
        )
        .unwrap();
    }
    std::fs::read(&path).unwrap()
}
