//! # gymrun
//!
//! Pulls the latest workout out of a GymRun backup.
//!
//! GymRun writes its backups as a ZIP archive holding a single SQLite
//! database, `gymapp.db`, encrypted with the WinZip AES extension under a
//! password fixed by the app. This crate:
//!
//! 1. locates the entry through the Central Directory and slices out its
//!    salt, password verifier, ciphertext and authentication code
//! 2. derives the keys with PBKDF2-HMAC-SHA1 and checks the verifier (and,
//!    by default, the authentication code)
//! 3. decrypts with AES in WinZip's little-endian counter mode and
//!    inflates the result
//! 4. queries the database for the entries of the most recent workout
//! 5. decodes each entry's `key-value` string and groups the sets by
//!    exercise
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     let backup = std::fs::read("GymRun-backup.zip")?;
//!     for group in gymrun::process_zip(&backup)? {
//!         println!("{}: {} sets", group[0].name, group.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Everything up to the SQL query is a pure function of the input bytes;
//! concurrent calls share nothing.

pub mod cli;
pub mod crypto;
pub mod error;
pub mod io;
pub mod state;
pub mod sync;
pub mod workout;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{BackupSource, HttpSource, LocalFileSource};
pub use state::StateContext;
pub use sync::{InputKind, Update, UpdateCoordinator};
pub use workout::{Exercise, ExerciseGroups, RawExerciseRow, WeightUnit};
pub use zip::{ExtractOptions, GYMRUN_PASSWORD, ZipExtractor};

/// Decrypt a backup archive and return the embedded database.
pub fn extract_database(archive: &[u8], options: &ExtractOptions) -> Result<Vec<u8>> {
    ZipExtractor::with_options(archive, options.clone()).extract_to_memory()
}

/// Archive bytes in, grouped exercises of the latest workout out.
pub fn process_zip(archive: &[u8]) -> Result<ExerciseGroups> {
    process_zip_with(archive, &ExtractOptions::default())
}

pub fn process_zip_with(archive: &[u8], options: &ExtractOptions) -> Result<ExerciseGroups> {
    let database = extract_database(archive, options)?;
    process_db(&database)
}

/// Same as [`process_zip`] for an already decrypted database.
pub fn process_db(database: &[u8]) -> Result<ExerciseGroups> {
    let rows = workout::read_exercise_rows(database)?;
    Ok(workout::parse_rows(&rows))
}
