use clap::Parser;
use std::path::PathBuf;

use crate::sync::InputKind;
use crate::zip::ExtractOptions;

#[derive(Parser, Debug)]
#[command(name = "gymrun")]
#[command(version)]
#[command(about = "Extract the latest workout from a GymRun backup", long_about = None)]
#[command(after_help = "Examples:\n  \
  gymrun GymRun-backup.zip                 print the latest workout\n  \
  gymrun --json https://host/backup.zip    download and print as JSON\n  \
  gymrun -s state.json backup.zip          print only if newer than last run\n  \
  gymrun --dump-db gymapp.db backup.zip    write the decrypted database")]
pub struct Cli {
    /// Backup ZIP path or download URL
    #[arg(value_name = "SOURCE", env = "GYMRUN_SOURCE")]
    pub source: String,

    /// SOURCE is an already decrypted gymapp.db
    #[arg(long)]
    pub db: bool,

    /// Write the decrypted database to PATH and exit
    #[arg(long = "dump-db", value_name = "PATH", conflicts_with = "db")]
    pub dump_db: Option<PathBuf>,

    /// State file; only workouts newer than the recorded one are printed
    #[arg(short = 's', long, value_name = "FILE", env = "GYMRUN_STATE")]
    pub state: Option<PathBuf>,

    /// Record and print the workout even if it is not newer
    #[arg(short = 'f', long, requires = "state")]
    pub force: bool,

    /// Do not check the archive's authentication code
    #[arg(long)]
    pub skip_auth_code: bool,

    /// Print the exercise groups as JSON
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            verify_auth_code: !self.skip_auth_code,
            ..ExtractOptions::default()
        }
    }

    pub fn input_kind(&self) -> InputKind {
        if self.db {
            InputKind::Database
        } else {
            InputKind::Archive
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.quiet {
            0 => "info",
            1 => "warn",
            _ => "error",
        }
    }
}
