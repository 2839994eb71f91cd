//! In-memory view state sitting between the handlers and the repositories.
//!
//! A store keeps the latest snapshot a screen rendered from, a `loading`
//! flag and the last error message. Reads never fail: a failed read is
//! logged, recorded in `error` and yields an empty default. Writes record the
//! failure the same way and hand the error back to the caller.
//!
//! Stores are built per request. Once set, `error` stays set for the rest of
//! the store's life, so a later successful read cannot hide an earlier failure.

mod day_plan;
mod exercise_store;
mod session_exercise_store;
mod session_store;

pub use day_plan::{DayPhase, DayPlan, SessionPlan};
pub use exercise_store::ExerciseStore;
pub use session_exercise_store::SessionExerciseStore;
pub use session_store::SessionStore;

use crate::error::AppError;

fn record_failure(slot: &mut Option<String>, action: &str, err: &AppError) {
    tracing::error!("Failed to {}: {}", action, err);
    *slot = Some(err.to_string());
}
