//! One update run: fetch the newest backup, decode it and record it if it
//! is newer than what was stored last time.
//!
//! Runs sharing an [`UpdateCoordinator`] are serialized, so two triggers
//! arriving together cannot both see the old high-water mark and both
//! publish the same workout.

use anyhow::{Context, Result};
use log::info;
use tokio::sync::Mutex;

use crate::io::BackupSource;
use crate::state::StateContext;
use crate::workout::{ExerciseGroups, max_time};
use crate::zip::ExtractOptions;

/// What the fetched bytes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Encrypted backup archive.
    Archive,
    /// Already decrypted `gymapp.db`.
    Database,
}

/// A workout newer than the stored high-water mark.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Latest set timestamp in milliseconds.
    pub time: i64,
    pub groups: ExerciseGroups,
}

pub struct UpdateCoordinator {
    lock: Mutex<()>,
    options: ExtractOptions,
    kind: InputKind,
}

impl UpdateCoordinator {
    pub fn new(options: ExtractOptions, kind: InputKind) -> Self {
        Self {
            lock: Mutex::new(()),
            options,
            kind,
        }
    }

    /// Fetch, decode and compare against `state`.
    ///
    /// Returns the new workout when it is newer than the stored one (or
    /// `force` is set) after recording it in `state`; `None` otherwise.
    /// `state` must not have been read before the call, so that it is
    /// loaded while the lock is held.
    pub async fn process<S>(
        &self,
        source: &S,
        state: &mut StateContext,
        force: bool,
    ) -> Result<Option<Update>>
    where
        S: BackupSource + ?Sized,
    {
        let _guard = self.lock.lock().await;

        let bytes = source.fetch().await?;
        info!("fetched {} bytes from {}", bytes.len(), source.describe());

        let groups = match self.kind {
            InputKind::Archive => crate::process_zip_with(&bytes, &self.options),
            InputKind::Database => crate::process_db(&bytes),
        }
        .with_context(|| format!("failed to process {}", source.describe()))?;

        let new_time = max_time(&groups);
        let last_time = state.last_updated()?;

        if !force && new_time <= last_time {
            info!(
                "no new workout (latest {}, stored {})",
                new_time, last_time
            );
            return Ok(None);
        }

        state.set_last_updated(new_time)?;
        state.set_data(groups.clone())?;
        state
            .persist()
            .with_context(|| format!("failed to write {}", state.path().display()))?;
        info!("recorded workout at {} with {} exercises", new_time, groups.len());

        Ok(Some(Update {
            time: new_time,
            groups,
        }))
    }
}
