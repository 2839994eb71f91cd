use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::Result;
use crate::models::{CreateExercise, Exercise, FromSqliteRow, UpdateExercise};

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Absent ids resolve to `None`, never to an error.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM Exercise WHERE id = ?")?;
            let result = stmt.query_row([&id], Exercise::from_row).optional()?;
            Ok(result)
        })
        .await?
    }

    /// Every exercise, newest first.
    pub async fn find_all(&self) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM Exercise ORDER BY created_at DESC, rowid DESC")?;
            let exercises = stmt
                .query_map([], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await?
    }

    pub async fn find_all_for_user(&self, user_id: &str) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM Exercise WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            )?;
            let exercises = stmt
                .query_map([&user_id], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await?
    }

    pub async fn create(&self, user_id: Option<&str>, data: CreateExercise) -> Result<Exercise> {
        let exercise = Exercise {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: data.name,
            description: data.description,
            image_url: data.image_url,
            video_url: data.video_url,
            user_id: user_id.map(str::to_string),
        };
        let exercise_clone = exercise.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO Exercise (id, created_at, name, description, image_url, video_url, user_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    exercise_clone.id,
                    exercise_clone.created_at,
                    exercise_clone.name,
                    exercise_clone.description,
                    exercise_clone.image_url,
                    exercise_clone.video_url,
                    exercise_clone.user_id
                ],
            )?;
            Ok(())
        })
        .await??;

        Ok(exercise)
    }

    /// Patch the given fields. With `user_id` set, only the owner's row matches.
    /// Returns the stored record after the update, or `None` if no row matched.
    pub async fn update(
        &self,
        id: &str,
        user_id: Option<&str>,
        patch: UpdateExercise,
    ) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn
                .query_row(
                    "UPDATE Exercise SET
                        name = COALESCE(?1, name),
                        description = COALESCE(?2, description),
                        image_url = COALESCE(?3, image_url),
                        video_url = COALESCE(?4, video_url)
                     WHERE id = ?5 AND (?6 IS NULL OR user_id = ?6)
                     RETURNING *",
                    rusqlite::params![
                        patch.name,
                        patch.description,
                        patch.image_url,
                        patch.video_url,
                        id,
                        user_id
                    ],
                    Exercise::from_row,
                )
                .optional()?;
            Ok(updated)
        })
        .await?
    }

    /// Join rows referencing the exercise go with it.
    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM Exercise WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)",
                rusqlite::params![id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await?
    }
}
