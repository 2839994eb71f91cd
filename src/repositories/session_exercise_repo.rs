use std::collections::HashMap;

use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::Result;
use crate::models::{
    CreateSessionExercise, FromSqliteRow, SessionExercise, SessionExerciseWithExercise,
    UpdateSessionExercise,
};

/// Join rows with the exercise columns inlined under `exercise_*` aliases.
const SELECT_WITH_EXERCISE: &str = "SELECT se.*,
        e.id AS exercise_ref,
        e.name AS exercise_name,
        e.description AS exercise_description,
        e.image_url AS exercise_image_url,
        e.video_url AS exercise_video_url
     FROM SessionExercise se
     LEFT JOIN Exercise e ON e.id = se.exercise_id";

#[derive(Clone)]
pub struct SessionExerciseRepository {
    pool: DbPool,
}

impl SessionExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Entries of one session in the order they were attached.
    pub async fn find_by_session(&self, session_id: &str) -> Result<Vec<SessionExerciseWithExercise>> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let sql = format!(
                "{} WHERE se.session_id = ? ORDER BY se.created_at, se.rowid",
                SELECT_WITH_EXERCISE
            );
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map([&session_id], SessionExerciseWithExercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await?
    }

    /// Entries of several sessions in one query, grouped by session id.
    /// Every requested id has a key, even when it has no entries.
    pub async fn find_by_sessions(
        &self,
        session_ids: &[String],
    ) -> Result<HashMap<String, Vec<SessionExerciseWithExercise>>> {
        let mut grouped: HashMap<String, Vec<SessionExerciseWithExercise>> = session_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        if session_ids.is_empty() {
            return Ok(grouped);
        }

        let pool = self.pool.clone();
        let ids = session_ids.to_vec();
        let entries = tokio::task::spawn_blocking(move || -> Result<Vec<SessionExerciseWithExercise>> {
            let conn = pool.get()?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "{} WHERE se.session_id IN ({}) ORDER BY se.created_at, se.rowid",
                SELECT_WITH_EXERCISE, placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map(
                    rusqlite::params_from_iter(ids.iter()),
                    SessionExerciseWithExercise::from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await??;

        for entry in entries {
            grouped
                .entry(entry.entry.session_id.clone())
                .or_default()
                .push(entry);
        }
        Ok(grouped)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<SessionExerciseWithExercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let sql = format!("{} WHERE se.id = ?", SELECT_WITH_EXERCISE);
            let mut stmt = conn.prepare(&sql)?;
            let result = stmt
                .query_row([&id], SessionExerciseWithExercise::from_row)
                .optional()?;
            Ok(result)
        })
        .await?
    }

    /// Every join row referencing an exercise, across all sessions.
    pub async fn find_by_exercise(&self, exercise_id: &str) -> Result<Vec<SessionExercise>> {
        let pool = self.pool.clone();
        let exercise_id = exercise_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM SessionExercise WHERE exercise_id = ? ORDER BY created_at, rowid",
            )?;
            let entries = stmt
                .query_map([&exercise_id], SessionExercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await?
    }

    pub async fn add(&self, data: CreateSessionExercise) -> Result<SessionExercise> {
        let mut entry = SessionExercise::new_bare(&data.session_id, &data.exercise_id, Utc::now());
        entry.sets = data.sets;
        entry.reps = data.reps;
        entry.rest_seconds = data.rest_seconds;
        entry.duration_seconds = data.duration_seconds;
        entry.notes = data.notes;
        let entry_clone = entry.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            insert_entry(&conn, &entry_clone)?;
            Ok(())
        })
        .await??;

        Ok(entry)
    }

    /// Attach bare (no overrides) entries for every id in one transaction.
    /// Either all rows are inserted or none are.
    pub async fn add_many(
        &self,
        session_id: &str,
        exercise_ids: &[String],
    ) -> Result<Vec<SessionExercise>> {
        let now = Utc::now();
        let entries: Vec<SessionExercise> = exercise_ids
            .iter()
            .map(|exercise_id| SessionExercise::new_bare(session_id, exercise_id, now))
            .collect();
        let entries_clone = entries.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            for entry in &entries_clone {
                insert_entry(&tx, entry)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await??;

        Ok(entries)
    }

    /// Patch the overrides; `None` fields keep their stored value.
    pub async fn update(
        &self,
        id: &str,
        patch: UpdateSessionExercise,
    ) -> Result<Option<SessionExercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn
                .query_row(
                    "UPDATE SessionExercise SET
                        sets = COALESCE(?1, sets),
                        reps = COALESCE(?2, reps),
                        rest_seconds = COALESCE(?3, rest_seconds),
                        duration_seconds = COALESCE(?4, duration_seconds),
                        notes = COALESCE(?5, notes)
                     WHERE id = ?6
                     RETURNING *",
                    rusqlite::params![
                        patch.sets,
                        patch.reps,
                        patch.rest_seconds,
                        patch.duration_seconds,
                        patch.notes,
                        id
                    ],
                    SessionExercise::from_row,
                )
                .optional()?;
            Ok(updated)
        })
        .await?
    }

    /// Overwrite every override; `None` fields are cleared to NULL.
    pub async fn replace(
        &self,
        id: &str,
        overrides: UpdateSessionExercise,
    ) -> Result<Option<SessionExercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn
                .query_row(
                    "UPDATE SessionExercise SET
                        sets = ?1,
                        reps = ?2,
                        rest_seconds = ?3,
                        duration_seconds = ?4,
                        notes = ?5
                     WHERE id = ?6
                     RETURNING *",
                    rusqlite::params![
                        overrides.sets,
                        overrides.reps,
                        overrides.rest_seconds,
                        overrides.duration_seconds,
                        overrides.notes,
                        id
                    ],
                    SessionExercise::from_row,
                )
                .optional()?;
            Ok(updated)
        })
        .await?
    }

    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Option<SessionExercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn
                .query_row(
                    "UPDATE SessionExercise SET completed = ? WHERE id = ? RETURNING *",
                    rusqlite::params![completed, id],
                    SessionExercise::from_row,
                )
                .optional()?;
            Ok(updated)
        })
        .await?
    }

    /// Remove exactly one entry by its own id.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute("DELETE FROM SessionExercise WHERE id = ?", [&id])?;
            Ok(rows > 0)
        })
        .await?
    }

    /// Bulk removal: drops every entry referencing `exercise_id` in every session.
    /// Use [`remove`](Self::remove) to detach a single entry.
    pub async fn remove_by_exercise(&self, exercise_id: &str) -> Result<usize> {
        let pool = self.pool.clone();
        let exercise_id = exercise_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM SessionExercise WHERE exercise_id = ?",
                [&exercise_id],
            )?;
            Ok(rows)
        })
        .await?
    }
}

fn insert_entry(conn: &rusqlite::Connection, entry: &SessionExercise) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO SessionExercise
            (id, session_id, exercise_id, sets, reps, rest_seconds, duration_seconds, notes, completed, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            entry.id,
            entry.session_id,
            entry.exercise_id,
            entry.sets,
            entry.reps,
            entry.rest_seconds,
            entry.duration_seconds,
            entry.notes,
            entry.completed,
            entry.created_at
        ],
    )?;
    Ok(())
}
