use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{deserialize_optional_i32, deserialize_optional_string, ExerciseSummary, FromSqliteRow};

/// One exercise attached to one session, with per-instance overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionExercise {
    pub id: String,
    pub session_id: String,
    pub exercise_id: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub rest_seconds: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for SessionExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            exercise_id: row.get("exercise_id")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            rest_seconds: row.get("rest_seconds")?,
            duration_seconds: row.get("duration_seconds")?,
            notes: row.get("notes")?,
            completed: row.get("completed")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl SessionExercise {
    pub(crate) fn new_bare(session_id: &str, exercise_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            exercise_id: exercise_id.to_string(),
            sets: None,
            reps: None,
            rest_seconds: None,
            duration_seconds: None,
            notes: None,
            completed: false,
            created_at,
        }
    }
}

/// A join row with the referenced exercise inlined.
///
/// `exercise` is `None` only when the row points at an exercise that no
/// longer resolves, which the cascade rules normally prevent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionExerciseWithExercise {
    pub entry: SessionExercise,
    pub exercise: Option<ExerciseSummary>,
}

impl FromSqliteRow for SessionExerciseWithExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let entry = SessionExercise::from_row(row)?;
        let exercise_ref: Option<String> = row.get("exercise_ref")?;
        let exercise = match exercise_ref {
            Some(id) => Some(ExerciseSummary {
                id,
                name: row.get("exercise_name")?,
                description: row.get("exercise_description")?,
                image_url: row.get("exercise_image_url")?,
                video_url: row.get("exercise_video_url")?,
            }),
            None => None,
        };
        Ok(Self { entry, exercise })
    }
}

impl SessionExerciseWithExercise {
    /// Replace the join-row fields with a freshly written row, keeping the inlined exercise.
    pub fn merge(&mut self, updated: SessionExercise) {
        self.entry = updated;
    }

    pub fn exercise_name(&self) -> &str {
        self.exercise
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("Exercise")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionExercise {
    pub session_id: String,
    pub exercise_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub sets: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub reps: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub rest_seconds: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub duration_seconds: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

/// Per-instance overrides. Applied as a patch, `None` keeps the stored value;
/// applied as a replacement (the entry edit form), `None` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionExercise {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub sets: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub reps: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub rest_seconds: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub duration_seconds: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}
