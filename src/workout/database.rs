//! Reading the latest workout out of a decrypted `gymapp.db`.

use log::debug;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::io::Write;
use tempfile::NamedTempFile;

use crate::error::Result;

use super::record::RawExerciseRow;

/// Every entry recorded between the start and end of the most recently
/// started workout.
pub const LATEST_WORKOUT_QUERY: &str = "\
    SELECT entry.time, entry.data, exercise.xlabel, exercise.unit \
    FROM entry \
    INNER JOIN exercise ON entry.exercise = exercise._id \
    WHERE entry.time >= (SELECT time_start FROM workout ORDER BY time_start DESC LIMIT 1) \
      AND entry.time <= (SELECT time_end FROM workout ORDER BY time_start DESC LIMIT 1)";

/// A read-only handle on a SQLite image held in memory.
///
/// SQLite wants a file, so the image is spilled to a temporary file that
/// lives as long as the handle.
pub struct WorkoutDatabase {
    // declared first so the connection closes before the file is removed
    conn: Connection,
    _file: NamedTempFile,
}

impl WorkoutDatabase {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;

        let conn = Connection::open_with_flags(
            file.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn, _file: file })
    }

    pub fn latest_workout_rows(&self) -> Result<Vec<RawExerciseRow>> {
        let mut stmt = self.conn.prepare(LATEST_WORKOUT_QUERY)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawExerciseRow {
                    time: integer(row, 0)?,
                    data: text(row, 1)?.unwrap_or_default(),
                    label: text(row, 2)?.unwrap_or_default(),
                    unit: text(row, 3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("latest workout has {} entries", rows.len());
        Ok(rows)
    }
}

/// Decrypted database bytes in, raw rows of the latest workout out.
pub fn read_exercise_rows(bytes: &[u8]) -> Result<Vec<RawExerciseRow>> {
    WorkoutDatabase::from_bytes(bytes)?.latest_workout_rows()
}

fn integer(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    match row.get_ref(idx)? {
        ValueRef::Integer(value) => Ok(value),
        ValueRef::Real(value) => Ok(value as i64),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "time".to_string(),
            other.data_type(),
        )),
    }
}

/// Columns declared as text sometimes hold integers (the unit code); take
/// whatever is stored and render it as a string.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}
