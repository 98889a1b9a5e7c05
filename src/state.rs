//! Persisted state: the high-water mark of the last published workout and
//! the data that went with it.
//!
//! A [`StateContext`] is created per run and passed explicitly. It reads
//! the state file on first access, keeps changes in memory and writes them
//! back only from [`StateContext::persist`], and only when something
//! changed.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::workout::ExerciseGroups;

/// On-disk layout of the state file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExerciseGroups>,
}

pub struct StateContext {
    path: PathBuf,
    state: Option<StoredState>,
    dirty: bool,
}

impl StateContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<&mut StoredState> {
        if self.state.is_none() {
            let state = match fs::read(&self.path) {
                Ok(bytes) => serde_json::from_slice(&bytes)?,
                Err(err) if err.kind() == ErrorKind::NotFound => StoredState::default(),
                Err(err) => return Err(err.into()),
            };
            debug!("loaded state from {}", self.path.display());
            self.state = Some(state);
        }
        Ok(self.state.get_or_insert_with(StoredState::default))
    }

    /// Timestamp (ms) of the last stored workout, 0 if none.
    pub fn last_updated(&mut self) -> Result<i64> {
        Ok(self.load()?.last_updated.unwrap_or(0))
    }

    pub fn data(&mut self) -> Result<Option<&ExerciseGroups>> {
        Ok(self.load()?.data.as_ref())
    }

    pub fn set_last_updated(&mut self, time: i64) -> Result<()> {
        self.load()?.last_updated = Some(time);
        self.dirty = true;
        Ok(())
    }

    pub fn set_data(&mut self, data: ExerciseGroups) -> Result<()> {
        self.load()?.data = Some(data);
        self.dirty = true;
        Ok(())
    }

    pub fn clear_data(&mut self) -> Result<()> {
        if self.load()?.data.take().is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the state back if it changed. The file is replaced atomically.
    pub fn persist(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let Some(state) = self.state.as_ref() else {
            return Ok(());
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, state)?;
        file.flush()?;
        file.persist(&self.path).map_err(|err| err.error)?;

        debug!("persisted state to {}", self.path.display());
        self.dirty = false;
        Ok(())
    }
}
