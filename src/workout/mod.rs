//! Workout data: the SQLite query and the record parser.

pub mod database;
pub mod record;

pub use database::{LATEST_WORKOUT_QUERY, WorkoutDatabase, read_exercise_rows};
pub use record::{
    Exercise, ExerciseGroups, RawExerciseRow, WeightUnit, flatten, group_exercises, kg_to_lbs,
    lbs_to_kg, max_time, parse_row, parse_rows,
};
