//! Exercise records decoded from GymRun's `entry.data` strings.
//!
//! An entry stores its values as comma-separated `key-value` pairs, e.g.
//! `3-1,4-45.5,5-10`. The keys this crate understands:
//!
//! | key  | meaning                         |
//! |------|---------------------------------|
//! | `3`  | set number                      |
//! | `4`  | weight, always in kilograms     |
//! | `5`  | reps                            |
//! | `52` | extra reps, added to `5`        |
//!
//! Pairs that do not parse as two numbers are dropped.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the latest-workout query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExerciseRow {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub data: String,
    pub label: String,
    /// Raw unit code; `None` for bodyweight exercises.
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Lbs,
    Kg,
}

impl WeightUnit {
    /// Map GymRun's unit code: `"2"` is pounds, anything else kilograms.
    pub fn from_code(code: Option<&str>) -> Option<Self> {
        code.map(|code| if code == "2" { Self::Lbs } else { Self::Kg })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lbs => "lbs",
            Self::Kg => "kg",
        }
    }
}

/// A single set, with the weight converted to its display unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub name: String,
    pub unit: Option<WeightUnit>,
    pub weight: f64,
    pub reps: i64,
    pub set: i64,
}

/// Sets grouped by exercise name, groups ordered by name and each group
/// ordered by set number.
pub type ExerciseGroups = Vec<Vec<Exercise>>;

const KEY_SET: f64 = 3.0;
const KEY_WEIGHT: f64 = 4.0;
const KEY_REPS: f64 = 5.0;
const KEY_EXTRA_REPS: f64 = 52.0;

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * 2.20462262
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs * 0.45359237
}

#[derive(Debug, Default)]
struct Fields {
    set: Option<f64>,
    weight: Option<f64>,
    reps: Option<f64>,
    extra_reps: Option<f64>,
}

impl Fields {
    fn parse(data: &str) -> Self {
        let mut fields = Self::default();
        for (key, value) in data.split(',').filter_map(parse_pair) {
            // a repeated key keeps its last value
            let slot = if key == KEY_SET {
                &mut fields.set
            } else if key == KEY_WEIGHT {
                &mut fields.weight
            } else if key == KEY_REPS {
                &mut fields.reps
            } else if key == KEY_EXTRA_REPS {
                &mut fields.extra_reps
            } else {
                continue;
            };
            *slot = Some(value);
        }
        fields
    }
}

fn parse_pair(pair: &str) -> Option<(f64, f64)> {
    let (key, value) = pair.split_once('-')?;
    let number = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    Some((number(key)?, number(value)?))
}

/// Round half up, the way the weights were always displayed.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Decode one row. Rows never fail; unknown or broken pairs are ignored.
pub fn parse_row(row: &RawExerciseRow) -> Exercise {
    let fields = Fields::parse(&row.data);
    let unit = WeightUnit::from_code(row.unit.as_deref());

    let weight = fields.weight.unwrap_or(0.0);
    let weight = match unit {
        Some(WeightUnit::Lbs) => round_half_up(kg_to_lbs(weight)),
        Some(WeightUnit::Kg) => weight.floor(),
        None => weight,
    };

    Exercise {
        time: row.time.saturating_mul(1000),
        name: row.label.clone(),
        unit,
        weight,
        reps: (fields.reps.unwrap_or(0.0) + fields.extra_reps.unwrap_or(0.0)).floor() as i64,
        set: fields.set.unwrap_or(0.0).floor() as i64,
    }
}

/// Exercise name ordering: case-insensitive first, then by code point so
/// that distinct names never compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Decode all rows and group them by exercise.
pub fn parse_rows(rows: &[RawExerciseRow]) -> ExerciseGroups {
    group_exercises(rows.iter().map(parse_row).collect())
}

/// Sort by set, then (stably) by name, and split into runs of equal name.
pub fn group_exercises(mut exercises: Vec<Exercise>) -> ExerciseGroups {
    exercises.sort_by_key(|exercise| exercise.set);
    exercises.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut groups: ExerciseGroups = Vec::new();
    for exercise in exercises {
        match groups.last_mut() {
            Some(group) if group[0].name == exercise.name => group.push(exercise),
            _ => groups.push(vec![exercise]),
        }
    }
    groups
}

pub fn flatten(groups: &ExerciseGroups) -> Vec<&Exercise> {
    groups.iter().flatten().collect()
}

/// Latest set timestamp in milliseconds, 0 when there are no sets.
pub fn max_time(groups: &ExerciseGroups) -> i64 {
    groups.iter().flatten().map(|e| e.time).max().unwrap_or(0)
}
