//! Main entry point for the gymrun CLI application.
//!
//! Fetches a GymRun backup from disk or a download URL, decrypts it and
//! prints the exercises of the latest workout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use gymrun::io::source_for;
use gymrun::{BackupSource, Cli, ExerciseGroups, InputKind, StateContext, UpdateCoordinator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let source = source_for(&cli.source)?;

    if let Some(ref path) = cli.dump_db {
        return dump_database(source.as_ref(), &cli, path).await;
    }

    let groups = match cli.state {
        // Compare against the recorded high-water mark
        Some(ref state_path) => {
            let coordinator = UpdateCoordinator::new(cli.extract_options(), cli.input_kind());
            let mut state = StateContext::new(state_path);
            match coordinator
                .process(source.as_ref(), &mut state, cli.force)
                .await?
            {
                Some(update) => update.groups,
                None => {
                    if !cli.is_very_quiet() {
                        eprintln!("No new workout since the last run");
                    }
                    return Ok(());
                }
            }
        }
        // Plain one-shot extraction
        None => {
            let bytes = source.fetch().await?;
            match cli.input_kind() {
                InputKind::Archive => gymrun::process_zip_with(&bytes, &cli.extract_options()),
                InputKind::Database => gymrun::process_db(&bytes),
            }
            .with_context(|| format!("failed to process {}", source.describe()))?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print_groups(&groups);
    }

    Ok(())
}

/// Decrypt the archive and write the embedded database to `path`.
async fn dump_database(source: &dyn BackupSource, cli: &Cli, path: &Path) -> Result<()> {
    let bytes = source.fetch().await?;
    let database = gymrun::extract_database(&bytes, &cli.extract_options())
        .with_context(|| format!("failed to decrypt {}", source.describe()))?;

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, &database)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    if !cli.is_quiet() {
        println!("  extracting: {} ({})", path.display(), format_size(database.len() as u64));
    }
    Ok(())
}

/// Print one block per exercise, one line per set.
fn print_groups(groups: &ExerciseGroups) {
    if groups.is_empty() {
        println!("No exercises in the latest workout");
        return;
    }

    for group in groups {
        println!("{}", group[0].name);
        for exercise in group {
            let load = match exercise.unit {
                Some(unit) => format!("{} {}", exercise.weight, unit.as_str()),
                None if exercise.weight == 0.0 => "bodyweight".to_string(),
                None => format!("bodyweight {:+}", exercise.weight),
            };
            println!(
                "  set {:>2}: {:>14} x {}",
                exercise.set, load, exercise.reps
            );
        }
    }
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
