//! Decryption of GymRun backup archives.
//!
//! A backup is a ZIP archive with a single entry (`gymapp.db`) encrypted
//! with the WinZip AES extension (AE-1/AE-2) and usually DEFLATE-compressed
//! underneath the encryption.
//!
//! ## Architecture
//!
//! - `structures`: signatures, compression methods, AES strength and the
//!   parsed archive metadata
//! - `parser`: Central Directory lookup and Local File Header walk
//! - `extractor`: password check, authentication code check, decryption
//!   and inflation
//!
//! ## Entry layout
//!
//! ```text
//! [salt (8/12/16)] [password verifier (2)] [ciphertext] [auth code (10)]
//! ```
//!
//! The total equals the compressed size recorded in the Central Directory.
//!
//! ## Limitations
//!
//! - Only the first entry is read; the archive must start with its
//!   Local File Header
//! - No ZIP64, no multi-disk archives
//! - Only STORED and DEFLATE under the encryption

mod cursor;
mod extractor;
mod parser;
mod structures;

pub use cursor::ByteReader;
pub use extractor::{ExtractOptions, GYMRUN_PASSWORD, ZipExtractor, inflate};
pub use parser::ZipParser;
pub use structures::*;
