//! Key derivation and decryption for WinZip AES entries.

pub mod ctr;
pub mod kdf;
pub mod mac;

pub use kdf::{DerivedKeys, PBKDF2_ITERATIONS, derive_keys};
