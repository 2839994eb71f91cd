pub mod exercise;
pub mod session;
pub mod session_exercise;
pub mod user;

use rusqlite::Row;
use serde::{Deserialize, Deserializer};

pub use exercise::{CreateExercise, Exercise, ExerciseSummary, UpdateExercise};
pub use session::{CreateSession, Session, UpdateSession};
pub use session_exercise::{
    CreateSessionExercise, SessionExercise, SessionExerciseWithExercise, UpdateSessionExercise,
};
pub use user::{CreateUser, LoginCredentials, User};

pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Deserialize an optional integer from a form field.
/// Handles empty strings by returning None instead of failing.
pub(crate) fn deserialize_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Deserialize an optional string from a form field, mapping blank input to None.
pub(crate) fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}
